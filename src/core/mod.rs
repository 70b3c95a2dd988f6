//! Core module containing the hypermedia value types

pub mod error;
pub mod link;
pub mod resource;
pub mod template;

pub use error::{HateoasError, Result};
pub use link::{Affordance, InputProperty, Link, OperationRef};
pub use resource::{Linkable, Links, Resource};
pub use template::{TemplateVariable, UriTemplate, VariableKind};
