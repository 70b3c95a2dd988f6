//! Resource-scoped link building
//!
//! [`AddLinks::add_links`] opens a context bound to one controller type and
//! one resource. Every `with_rel` inside the closure records a link; when the
//! closure succeeds, the links are written to the resource, each replacing
//! any link the resource already had under the same relation. If the
//! closure fails, the resource is left untouched.
//!
//! ```rust,ignore
//! customer.add_links(&links, CustomerController, |links, customer| {
//!     links
//!         .on(CustomerController::find_by_id(&customer.id))?
//!         .with_rel(Link::REL_SELF)
//!         .and_affordance(CustomerController::delete(&customer.id))?;
//!     links
//!         .on(CustomerController::find_products_by_id(&customer.id))?
//!         .with_rel("products");
//!     Ok(())
//! })?;
//! ```

use crate::core::error::Result;
use crate::core::link::Affordance;
use crate::core::resource::{Linkable, Links};
use crate::dsl::builder::{LinkBuilder, LinkTo};
use crate::routes::{Controller, Invocation};
use std::marker::PhantomData;

/// Link building context bound to controller `C`
pub struct ScopedLinks<'a, C> {
    builder: &'a LinkBuilder,
    links: Links,
    _controller: PhantomData<fn() -> C>,
}

impl<'a, C: Controller> ScopedLinks<'a, C> {
    fn new(builder: &'a LinkBuilder) -> Self {
        Self {
            builder,
            links: Links::new(),
            _controller: PhantomData,
        }
    }

    /// Resolve an operation of the bound controller
    pub fn on(&mut self, invocation: Invocation<C>) -> Result<PendingLink<'_, 'a, C>> {
        let target = self.builder.link_to(invocation)?;
        Ok(PendingLink {
            scope: self,
            target,
        })
    }

    /// Alias of [`ScopedLinks::on`]
    pub fn link_to(&mut self, invocation: Invocation<C>) -> Result<PendingLink<'_, 'a, C>> {
        self.on(invocation)
    }

    /// Describe an operation of the bound controller as an affordance
    pub fn afford(&self, invocation: Invocation<C>) -> Result<Affordance> {
        self.builder.afford(invocation)
    }

    /// Links recorded so far
    pub fn links(&self) -> &Links {
        &self.links
    }
}

/// A resolved target inside a scope, awaiting its relation
pub struct PendingLink<'s, 'a, C> {
    scope: &'s mut ScopedLinks<'a, C>,
    target: LinkTo,
}

impl<'s, 'a, C: Controller> PendingLink<'s, 'a, C> {
    pub fn slash(self, segment: impl std::fmt::Display) -> Self {
        Self {
            scope: self.scope,
            target: self.target.slash(segment),
        }
    }

    /// Record the link under `rel`, replacing an earlier one with that relation
    pub fn with_rel(self, rel: impl Into<String>) -> AddedLink<'s, 'a, C> {
        let link = self.target.with_rel(rel);
        let rel = link.rel().to_string();
        self.scope.links.replace(link);
        AddedLink {
            scope: self.scope,
            rel,
        }
    }

    pub fn with_self_rel(self) -> AddedLink<'s, 'a, C> {
        self.with_rel(crate::core::link::Link::REL_SELF)
    }
}

/// Handle on a link just recorded in a scope
pub struct AddedLink<'s, 'a, C> {
    scope: &'s mut ScopedLinks<'a, C>,
    rel: String,
}

impl<'s, 'a, C: Controller> AddedLink<'s, 'a, C> {
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// Replace the recorded link with one carrying one more affordance
    pub fn and_affordance(self, invocation: Invocation<C>) -> Result<Self> {
        let affordance = self.scope.afford(invocation)?;
        Ok(self.augment(vec![affordance]))
    }

    /// Replace the recorded link with one carrying every collected affordance
    pub fn and_affordances<F>(self, build: F) -> Result<Self>
    where
        F: FnOnce(&mut ScopedAffordances<'_, C>) -> Result<()>,
    {
        let mut collector = ScopedAffordances {
            builder: self.scope.builder,
            collected: Vec::new(),
            _controller: PhantomData,
        };
        build(&mut collector)?;
        Ok(self.augment(collector.collected))
    }

    fn augment(self, affordances: Vec<Affordance>) -> Self {
        if let Some(current) = self.scope.links.get_link(&self.rel).cloned() {
            self.scope.links.replace(current.and_affordances(affordances));
        }
        self
    }
}

/// Collects affordances of the bound controller
pub struct ScopedAffordances<'b, C> {
    builder: &'b LinkBuilder,
    collected: Vec<Affordance>,
    _controller: PhantomData<fn() -> C>,
}

impl<'b, C: Controller> ScopedAffordances<'b, C> {
    pub fn afford(&mut self, invocation: Invocation<C>) -> Result<&mut Self> {
        let affordance = self.builder.afford(invocation)?;
        self.collected.push(affordance);
        Ok(self)
    }
}

/// Resource-scoped link building for every [`Linkable`]
pub trait AddLinks: Linkable + Sized {
    /// Build links against controller `C` and add them to this resource
    ///
    /// The closure receives the scope and a read-only view of the resource.
    fn add_links<C, F>(&mut self, builder: &LinkBuilder, _controller: C, build: F) -> Result<&mut Self>
    where
        C: Controller,
        F: FnOnce(&mut ScopedLinks<'_, C>, &Self) -> Result<()>,
    {
        let mut scope = ScopedLinks::new(builder);
        build(&mut scope, self)?;

        for link in scope.links {
            tracing::debug!(
                controller = C::NAME,
                rel = %link.rel(),
                href = %link.href(),
                "Adding link to resource"
            );
            self.links_mut().replace(link);
        }
        Ok(self)
    }
}

impl<R: Linkable> AddLinks for R {}
