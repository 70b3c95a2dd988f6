//! Controller routes that links are resolved against
//!
//! This module replaces method interception with an explicit table: each
//! controller operation is declared once with its verb, path template and
//! parameter bindings, and link builders look routes up by operation name
//! plus concrete argument values.

pub mod base_uri;
pub mod controller;
pub mod registry;

pub use base_uri::BaseUri;
pub use controller::{
    Controller, ControllerMapping, Invocation, InvocationRef, OperationMapping, ParamBinding,
    ParamMapping,
};
pub use registry::{ResolvedRoute, RouteRegistry};
