//! # hateoas-rs
//!
//! Fluent builders for hypermedia links and affordances, resolved against an
//! explicit registry of controller routes instead of hand-assembled URLs.
//!
//! ## Features
//!
//! - **Route Registry**: Declare each controller operation once (verb, path, parameter bindings)
//! - **Typed Invocations**: Reference operations through the controller type, not strings
//! - **Affordances**: Links carry the follow-up actions a client may take
//! - **Scoped Builder**: Decorate a resource with links bound to one controller
//! - **URI Templates**: Unbound optional query parameters stay templated
//! - **Proxy Aware**: Base URI derived from `Host` and `X-Forwarded-*` headers
//! - **Configuration-Based**: Declare controllers in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hateoas::prelude::*;
//!
//! struct CustomerController;
//!
//! impl Controller for CustomerController {
//!     const NAME: &'static str = "customers";
//!
//!     fn mapping() -> ControllerMapping {
//!         ControllerMapping::new(Self::NAME, "/customers")
//!             .get("find_by_id", "/{id}", [ParamMapping::path("id")])
//!             .delete("delete", "/{id}", [ParamMapping::path("id")])
//!     }
//! }
//!
//! impl CustomerController {
//!     fn find_by_id(id: &str) -> Invocation<Self> {
//!         Self::invoke("find_by_id").arg("id", id)
//!     }
//!
//!     fn delete(id: &str) -> Invocation<Self> {
//!         Self::invoke("delete").arg("id", id)
//!     }
//! }
//!
//! let registry = Arc::new(RouteRegistry::new().with::<CustomerController>());
//! let links = LinkBuilder::new(registry, BaseUri::localhost());
//!
//! let self_link = links
//!     .link_to(CustomerController::find_by_id("15"))?
//!     .with_self_rel()
//!     .and_affordance(links.afford(CustomerController::delete("15"))?);
//!
//! assert_eq!(self_link.href(), "http://localhost/customers/15");
//! ```

pub mod config;
pub mod core;
pub mod dsl;
pub mod routes;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        error::{HateoasError, Result},
        link::{Affordance, InputProperty, Link, OperationRef},
        resource::{Linkable, Links, Resource},
        template::{TemplateVariable, UriTemplate, VariableKind},
    };

    // === Macros ===
    pub use crate::impl_linkable;

    // === Routes ===
    pub use crate::routes::{
        BaseUri, Controller, ControllerMapping, Invocation, InvocationRef, OperationMapping,
        ParamBinding, ParamMapping, ResolvedRoute, RouteRegistry,
    };

    // === DSL ===
    pub use crate::dsl::{AddLinks, Affordances, LinkBuilder, LinkTo};

    // === Config ===
    pub use crate::config::RoutesConfig;

    // === External dependencies ===
    pub use axum::http::Method;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
