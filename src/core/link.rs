//! Hypermedia links and affordances
//!
//! A [`Link`] points at a resolved controller route under a relation name
//! and carries the [`Affordance`]s a client may follow from it. Both are
//! plain values: adding an affordance yields a new link and never touches
//! the one it was derived from.

use crate::core::error::Result;
use crate::core::template::UriTemplate;
use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference to the controller operation an affordance was derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationRef {
    /// Registered controller name (e.g., "customers")
    pub controller: String,

    /// Operation name within the controller (e.g., "find_by_id")
    pub operation: String,
}

impl OperationRef {
    pub fn new(controller: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            operation: operation.into(),
        }
    }
}

/// A field the client is expected to send in the request body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputProperty {
    pub name: String,

    #[serde(default)]
    pub required: bool,
}

/// A follow-up action available to the client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Affordance {
    #[serde(with = "method_serde")]
    method: Method,
    name: String,
    operation: OperationRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    input: Vec<InputProperty>,
}

impl Affordance {
    pub fn new(
        method: Method,
        name: impl Into<String>,
        operation: OperationRef,
        input: Vec<InputProperty>,
    ) -> Self {
        Self {
            method,
            name: name.into(),
            operation,
            input,
        }
    }

    /// The HTTP verb of the operation
    pub fn http_method(&self) -> &Method {
        &self.method
    }

    /// The operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operation this affordance was derived from
    pub fn operation(&self) -> &OperationRef {
        &self.operation
    }

    /// Request body fields of the operation
    pub fn input(&self) -> &[InputProperty] {
        &self.input
    }
}

/// A relation name bound to a target href, with its affordances
///
/// Equality and hashing cover the relation, the href and the affordances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    rel: String,
    href: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    affordances: Vec<Affordance>,
}

impl Link {
    pub const REL_SELF: &'static str = "self";
    pub const REL_FIRST: &'static str = "first";
    pub const REL_PREVIOUS: &'static str = "prev";
    pub const REL_NEXT: &'static str = "next";
    pub const REL_LAST: &'static str = "last";

    /// Create a link without affordances
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            affordances: Vec::new(),
        }
    }

    pub(crate) fn with_affordances(
        href: impl Into<String>,
        rel: impl Into<String>,
        affordances: Vec<Affordance>,
    ) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            affordances,
        }
    }

    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    /// Whether the href still contains template variables
    pub fn is_templated(&self) -> bool {
        UriTemplate::is_template(&self.href)
    }

    /// The href parsed as a template
    pub fn template(&self) -> Result<UriTemplate> {
        UriTemplate::new(&self.href)
    }

    /// Same link under a different relation
    pub fn with_rel(&self, rel: impl Into<String>) -> Link {
        Link {
            rel: rel.into(),
            ..self.clone()
        }
    }

    /// Resolve the template variables of a templated link
    pub fn expand(&self, values: &HashMap<String, Vec<String>>) -> Result<Link> {
        Ok(Link {
            href: self.template()?.expand(values)?,
            ..self.clone()
        })
    }

    /// New link with one more affordance
    pub fn and_affordance(self, affordance: Affordance) -> Link {
        self.and_affordances([affordance])
    }

    /// New link with the given affordances appended
    pub fn and_affordances(mut self, affordances: impl IntoIterator<Item = Affordance>) -> Link {
        self.affordances.extend(affordances);
        self
    }
}

pub(crate) mod method_serde {
    use axum::http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(serde::de::Error::custom)
    }
}
