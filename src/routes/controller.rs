//! Controller route declarations and simulated invocations
//!
//! A controller is described once by a [`ControllerMapping`]: its base path
//! and, per operation, the HTTP verb, the path relative to the base and how
//! each parameter is bound. An [`Invocation`] names one of those operations
//! together with concrete argument values; it stands in for a call that is
//! never executed and is only resolved into a URL.

use crate::core::link::method_serde;
use axum::http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamBinding {
    /// Substituted into the path template
    Path,
    /// Rendered as a query parameter
    Query,
    /// Sent in the request body, never part of the href
    Body,
}

fn default_required() -> bool {
    true
}

/// A single operation parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMapping {
    pub name: String,

    pub binding: ParamBinding,

    #[serde(default = "default_required")]
    pub required: bool,
}

impl ParamMapping {
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ParamBinding::Path,
            required: true,
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ParamBinding::Query,
            required: true,
        }
    }

    /// A query parameter left as a template variable when not supplied
    pub fn optional_query(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::query(name)
        }
    }

    pub fn body(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ParamBinding::Body,
            required: true,
        }
    }

    pub fn optional_body(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::body(name)
        }
    }
}

/// One routed operation of a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMapping {
    /// Operation name, also used as the affordance name
    pub name: String,

    #[serde(with = "method_serde")]
    pub method: Method,

    /// Path relative to the controller base path (e.g., "/{id}")
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub params: Vec<ParamMapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OperationMapping {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            params: params.into_iter().collect(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Find a declared parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamMapping> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameters with the given binding, in declaration order
    pub fn params_bound_to(&self, binding: ParamBinding) -> impl Iterator<Item = &ParamMapping> {
        self.params.iter().filter(move |p| p.binding == binding)
    }
}

/// Route declarations for one controller
///
/// # Example
///
/// ```
/// use hateoas::routes::{ControllerMapping, ParamMapping};
///
/// let mapping = ControllerMapping::new("customers", "/customers")
///     .get("find_by_id", "/{id}", [ParamMapping::path("id")])
///     .delete("delete", "/{id}", [ParamMapping::path("id")]);
///
/// assert_eq!(mapping.operations.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerMapping {
    pub name: String,

    #[serde(default)]
    pub base_path: String,

    #[serde(default)]
    pub operations: Vec<OperationMapping>,
}

impl ControllerMapping {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            operations: Vec::new(),
        }
    }

    /// Add an operation; a later operation with the same name wins
    pub fn operation(mut self, operation: OperationMapping) -> Self {
        self.operations.retain(|op| op.name != operation.name);
        self.operations.push(operation);
        self
    }

    pub fn get(
        self,
        name: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        self.operation(OperationMapping::new(name, Method::GET, path, params))
    }

    pub fn post(
        self,
        name: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        self.operation(OperationMapping::new(name, Method::POST, path, params))
    }

    pub fn put(
        self,
        name: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        self.operation(OperationMapping::new(name, Method::PUT, path, params))
    }

    pub fn patch(
        self,
        name: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        self.operation(OperationMapping::new(name, Method::PATCH, path, params))
    }

    pub fn delete(
        self,
        name: impl Into<String>,
        path: impl Into<String>,
        params: impl IntoIterator<Item = ParamMapping>,
    ) -> Self {
        self.operation(OperationMapping::new(name, Method::DELETE, path, params))
    }

    pub fn find_operation(&self, name: &str) -> Option<&OperationMapping> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// A controller type whose operations can be linked to
///
/// Implementors are usually unit structs that also expose one associated
/// function per operation returning an [`Invocation`]:
///
/// ```
/// use hateoas::routes::{Controller, ControllerMapping, Invocation, ParamMapping};
///
/// struct CustomerController;
///
/// impl Controller for CustomerController {
///     const NAME: &'static str = "customers";
///
///     fn mapping() -> ControllerMapping {
///         ControllerMapping::new(Self::NAME, "/customers")
///             .get("find_by_id", "/{id}", [ParamMapping::path("id")])
///     }
/// }
///
/// impl CustomerController {
///     fn find_by_id(id: &str) -> Invocation<Self> {
///         Self::invoke("find_by_id").arg("id", id)
///     }
/// }
///
/// let call = CustomerController::find_by_id("15");
/// assert_eq!(call.untyped().operation, "find_by_id");
/// ```
pub trait Controller: 'static {
    /// Name the controller is registered under
    const NAME: &'static str;

    fn mapping() -> ControllerMapping;

    /// Start describing a call to one of this controller's operations
    fn invoke(operation: &str) -> Invocation<Self>
    where
        Self: Sized,
    {
        Invocation::new(operation)
    }
}

/// A simulated call, not tied to a controller type
///
/// Used for controllers declared in configuration rather than in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRef {
    pub controller: String,
    pub operation: String,
    pub args: IndexMap<String, String>,
}

impl InvocationRef {
    pub fn new(controller: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            operation: operation.into(),
            args: IndexMap::new(),
        }
    }

    /// Bind an argument value; binding the same name again overwrites it
    pub fn arg(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.insert(name.into(), value.to_string());
        self
    }
}

/// A simulated call on controller `C`
pub struct Invocation<C> {
    inner: InvocationRef,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> Invocation<C> {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            inner: InvocationRef::new(C::NAME, operation),
            _controller: PhantomData,
        }
    }
}

impl<C> Invocation<C> {
    /// Bind an argument value
    pub fn arg(self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            inner: self.inner.arg(name, value),
            _controller: PhantomData,
        }
    }

    pub fn untyped(&self) -> &InvocationRef {
        &self.inner
    }
}

impl<C> Clone for Invocation<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _controller: PhantomData,
        }
    }
}

impl<C> fmt::Debug for Invocation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Invocation").field(&self.inner).finish()
    }
}

impl<C> From<Invocation<C>> for InvocationRef {
    fn from(invocation: Invocation<C>) -> Self {
        invocation.inner
    }
}
