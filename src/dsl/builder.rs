//! Fluent link and affordance builders
//!
//! ```rust,ignore
//! let links = LinkBuilder::new(registry, BaseUri::localhost());
//!
//! let self_link = links
//!     .link_to(CustomerController::find_by_id("15"))?
//!     .with_self_rel();
//!
//! let with_actions = links.and_affordances(&self_link, |a| {
//!     a.afford(CustomerController::update("15"))?;
//!     a.afford(CustomerController::delete("15"))?;
//!     Ok(())
//! })?;
//! ```

use crate::core::error::Result;
use crate::core::link::{Affordance, Link};
use crate::core::template::SEGMENT;
use crate::routes::{BaseUri, InvocationRef, RouteRegistry};
use percent_encoding::utf8_percent_encode;
use std::fmt;
use std::sync::Arc;

/// Entry point for building links against a route registry
///
/// Cheap to clone: the registry is shared and only the base URI is owned.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    registry: Arc<RouteRegistry>,
    base_uri: BaseUri,
}

impl LinkBuilder {
    pub fn new(registry: Arc<RouteRegistry>, base_uri: BaseUri) -> Self {
        Self { registry, base_uri }
    }

    /// Same registry, different base URI (e.g., per request)
    pub fn with_base_uri(&self, base_uri: BaseUri) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            base_uri,
        }
    }

    pub fn base_uri(&self) -> &BaseUri {
        &self.base_uri
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Resolve an invocation into a link that still needs a relation
    ///
    /// The pending link already carries the affordance of the invoked
    /// operation itself.
    pub fn link_to(&self, invocation: impl Into<InvocationRef>) -> Result<LinkTo> {
        let route = self.registry.resolve(&invocation.into())?;

        Ok(LinkTo {
            href: self.base_uri.resolve(&route.path),
            affordance: route.affordance(),
        })
    }

    /// Describe an operation as an affordance, independent of any link
    pub fn afford(&self, invocation: impl Into<InvocationRef>) -> Result<Affordance> {
        Ok(self.registry.resolve(&invocation.into())?.affordance())
    }

    /// Copy of `link` with the affordance of one more operation
    pub fn and_affordance(&self, link: &Link, invocation: impl Into<InvocationRef>) -> Result<Link> {
        Ok(link.clone().and_affordance(self.afford(invocation)?))
    }

    /// Copy of `link` with every affordance collected by `build`
    pub fn and_affordances<F>(&self, link: &Link, build: F) -> Result<Link>
    where
        F: FnOnce(&mut Affordances<'_>) -> Result<()>,
    {
        let mut affordances = Affordances::new(self);
        build(&mut affordances)?;
        Ok(link.clone().and_affordances(affordances.into_inner()))
    }
}

/// Collects affordances inside [`LinkBuilder::and_affordances`]
pub struct Affordances<'a> {
    builder: &'a LinkBuilder,
    collected: Vec<Affordance>,
}

impl<'a> Affordances<'a> {
    fn new(builder: &'a LinkBuilder) -> Self {
        Self {
            builder,
            collected: Vec::new(),
        }
    }

    pub fn afford(&mut self, invocation: impl Into<InvocationRef>) -> Result<&mut Self> {
        let affordance = self.builder.afford(invocation)?;
        self.collected.push(affordance);
        Ok(self)
    }

    /// Add an affordance built elsewhere
    pub fn push(&mut self, affordance: Affordance) -> &mut Self {
        self.collected.push(affordance);
        self
    }

    fn into_inner(self) -> Vec<Affordance> {
        self.collected
    }
}

/// A resolved link target awaiting its relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTo {
    href: String,
    affordance: Affordance,
}

impl LinkTo {
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The affordance of the operation this link points at
    pub fn affordance(&self) -> &Affordance {
        &self.affordance
    }

    /// Append a path segment, ahead of any query, fragment or template part
    pub fn slash(mut self, segment: impl fmt::Display) -> Self {
        let segment = segment.to_string();
        let encoded = utf8_percent_encode(segment.trim_matches('/'), SEGMENT).to_string();
        if encoded.is_empty() {
            return self;
        }

        let split = self.href.find(['?', '#', '{']).unwrap_or(self.href.len());
        let (path, rest) = self.href.split_at(split);
        let separator = if path.ends_with('/') { "" } else { "/" };
        self.href = format!("{}{}{}{}", path, separator, encoded, rest);
        self
    }

    /// Finalize into a link with the given relation
    pub fn with_rel(self, rel: impl Into<String>) -> Link {
        Link::with_affordances(self.href, rel, vec![self.affordance])
    }

    pub fn with_self_rel(self) -> Link {
        self.with_rel(Link::REL_SELF)
    }
}
