//! Route registry for controller operations
//!
//! Resolves a simulated invocation (controller, operation, argument values)
//! into the path it addresses and the affordance describing it.

use crate::config::RoutesConfig;
use crate::core::error::{HateoasError, Result};
use crate::core::link::{Affordance, InputProperty, OperationRef};
use crate::core::template::{QUERY, TemplateVariable, UriTemplate, VariableKind};
use crate::routes::controller::{
    Controller, ControllerMapping, InvocationRef, OperationMapping, ParamBinding,
};
use axum::http::Method;
use indexmap::IndexMap;
use percent_encoding::utf8_percent_encode;
use std::collections::HashMap;

/// The outcome of resolving an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub operation: OperationRef,
    pub method: Method,

    /// Path relative to the base URI, possibly still templated for
    /// optional query parameters that were not supplied
    pub path: String,

    /// Request body fields of the operation
    pub input: Vec<InputProperty>,
}

impl ResolvedRoute {
    /// The affordance describing this operation
    pub fn affordance(&self) -> Affordance {
        Affordance::new(
            self.method.clone(),
            self.operation.operation.clone(),
            self.operation.clone(),
            self.input.clone(),
        )
    }
}

/// Registry of controller route declarations
///
/// Controllers are registered once at startup; afterwards the registry is
/// read-only and usually shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    controllers: IndexMap<String, ControllerMapping>,
}

impl RouteRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            controllers: IndexMap::new(),
        }
    }

    /// Create a registry from route declarations loaded from configuration
    pub fn from_config(config: &RoutesConfig) -> Self {
        let mut registry = Self::new();
        for mapping in &config.controllers {
            registry.register_mapping(mapping.clone());
        }
        registry
    }

    /// Register a controller type
    pub fn register<C: Controller>(&mut self) -> &mut Self {
        self.register_mapping(C::mapping())
    }

    /// Builder-style variant of [`RouteRegistry::register`]
    pub fn with<C: Controller>(mut self) -> Self {
        self.register::<C>();
        self
    }

    /// Register a controller mapping
    ///
    /// The controller name is used as the key; registering the same name
    /// again replaces the earlier mapping.
    pub fn register_mapping(&mut self, mapping: ControllerMapping) -> &mut Self {
        tracing::debug!(
            controller = %mapping.name,
            base_path = %mapping.base_path,
            operations = mapping.operations.len(),
            "Registering controller routes"
        );

        if let Some(previous) = self.controllers.insert(mapping.name.clone(), mapping) {
            tracing::warn!(
                controller = %previous.name,
                "Controller registered twice, replacing previous routes"
            );
        }
        self
    }

    /// Names of all registered controllers, in registration order
    pub fn controllers(&self) -> Vec<&str> {
        self.controllers.keys().map(|s| s.as_str()).collect()
    }

    /// The mapping of a registered controller
    pub fn controller(&self, name: &str) -> Result<&ControllerMapping> {
        self.controllers
            .get(name)
            .ok_or_else(|| HateoasError::UnknownController {
                controller: name.to_string(),
            })
    }

    /// Operations declared by a registered controller
    pub fn operations_of(&self, controller: &str) -> Result<&[OperationMapping]> {
        Ok(&self.controller(controller)?.operations)
    }

    /// Find one operation of a registered controller
    pub fn find(&self, controller: &str, operation: &str) -> Result<&OperationMapping> {
        self.controller(controller)?
            .find_operation(operation)
            .ok_or_else(|| HateoasError::UnknownOperation {
                controller: controller.to_string(),
                operation: operation.to_string(),
            })
    }

    /// Resolve an invocation into the path and affordance metadata it addresses
    ///
    /// - path variables must all be supplied
    /// - supplied query parameters are rendered, required ones must be supplied
    /// - missing optional query parameters stay as `{?name}` variables
    /// - body parameters never appear in the path
    pub fn resolve(&self, invocation: &InvocationRef) -> Result<ResolvedRoute> {
        let controller = self.controller(&invocation.controller)?;
        let operation = self.find(&invocation.controller, &invocation.operation)?;

        let template = UriTemplate::new(&join_paths(&controller.base_path, &operation.path))?;

        for name in invocation.args.keys() {
            let declared = operation.param(name).is_some()
                || template.variables().any(|v| &v.name == name);
            if !declared {
                return Err(HateoasError::UnknownArgument {
                    operation: operation.name.clone(),
                    name: name.clone(),
                });
            }
        }

        let values: HashMap<String, Vec<String>> = template
            .variables()
            .filter_map(|v| {
                invocation
                    .args
                    .get(&v.name)
                    .map(|value| (v.name.clone(), vec![value.clone()]))
            })
            .collect();
        let mut path = template.expand(&values)?;

        let mut unbound = Vec::new();
        for param in operation.params_bound_to(ParamBinding::Query) {
            let in_template = template.variables().any(|v| v.name == param.name);
            match invocation.args.get(&param.name) {
                // already expanded from the path template
                Some(_) if in_template => {}
                Some(value) => {
                    path.push(if path.contains('?') { '&' } else { '?' });
                    path.push_str(&param.name);
                    path.push('=');
                    path.extend(utf8_percent_encode(value, QUERY));
                }
                None if param.required => {
                    return Err(HateoasError::missing_argument(
                        &param.name,
                        format!("operation '{}'", operation.name),
                    ));
                }
                None => unbound.push(TemplateVariable::new(
                    param.name.clone(),
                    VariableKind::RequestParam,
                )),
            }
        }

        if !unbound.is_empty() {
            path = UriTemplate::new(&path)?.with(unbound).to_string();
        }

        let input = operation
            .params_bound_to(ParamBinding::Body)
            .map(|p| InputProperty {
                name: p.name.clone(),
                required: p.required,
            })
            .collect();

        tracing::debug!(
            controller = %controller.name,
            operation = %operation.name,
            path = %path,
            "Resolved invocation"
        );

        Ok(ResolvedRoute {
            operation: OperationRef::new(controller.name.clone(), operation.name.clone()),
            method: operation.method.clone(),
            path,
            input,
        })
    }
}

fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let joined = match path {
        "" => base.to_string(),
        p if p.starts_with('/') || ["{/", "{?", "{&", "{#"].iter().any(|op| p.starts_with(op)) => {
            format!("{}{}", base, p)
        }
        p => format!("{}/{}", base, p),
    };

    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::controller::ParamMapping;

    fn create_test_registry() -> RouteRegistry {
        let mut registry = RouteRegistry::new();
        registry.register_mapping(
            ControllerMapping::new("customers", "/customers")
                .get("find_all", "", [
                    ParamMapping::optional_query("page"),
                    ParamMapping::optional_query("size"),
                ])
                .get("find_by_id", "/{id}", [ParamMapping::path("id")])
                .get("search", "/search", [ParamMapping::query("q")])
                .put("update", "/{id}", [
                    ParamMapping::path("id"),
                    ParamMapping::body("name"),
                    ParamMapping::optional_body("email"),
                ])
                .delete("delete", "/{id}", [ParamMapping::path("id")]),
        );
        registry
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = RouteRegistry::new();
        assert!(registry.controllers().is_empty());
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = create_test_registry();
        registry.register_mapping(ControllerMapping::new("customers", "/clients"));

        assert_eq!(registry.controllers(), vec!["customers"]);
        assert_eq!(registry.controller("customers").unwrap().base_path, "/clients");
        assert!(registry.operations_of("customers").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_path_variable() {
        let registry = create_test_registry();
        let route = registry
            .resolve(&InvocationRef::new("customers", "find_by_id").arg("id", 15))
            .unwrap();

        assert_eq!(route.path, "/customers/15");
        assert_eq!(route.method, Method::GET);
        assert_eq!(route.operation, OperationRef::new("customers", "find_by_id"));
        assert!(route.input.is_empty());
    }

    #[test]
    fn test_resolve_keeps_unbound_optional_query_params_templated() {
        let registry = create_test_registry();

        let route = registry
            .resolve(&InvocationRef::new("customers", "find_all"))
            .unwrap();
        assert_eq!(route.path, "/customers{?page,size}");

        let route = registry
            .resolve(&InvocationRef::new("customers", "find_all").arg("page", 2))
            .unwrap();
        assert_eq!(route.path, "/customers?page=2{&size}");
    }

    #[test]
    fn test_resolve_required_query_param() {
        let registry = create_test_registry();

        let route = registry
            .resolve(&InvocationRef::new("customers", "search").arg("q", "John Doe"))
            .unwrap();
        assert_eq!(route.path, "/customers/search?q=John%20Doe");

        let err = registry
            .resolve(&InvocationRef::new("customers", "search"))
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_ARGUMENT");
    }

    #[test]
    fn test_resolve_query_param_declared_in_path_template() {
        let mut registry = RouteRegistry::new();
        registry.register_mapping(
            ControllerMapping::new("customers", "/customers")
                .get("search", "/search{?q}", [ParamMapping::query("q")])
                .get("find_all", "{?page}", [
                    ParamMapping::optional_query("page"),
                    ParamMapping::optional_query("size"),
                ]),
        );

        let route = registry
            .resolve(&InvocationRef::new("customers", "search").arg("q", "john"))
            .unwrap();
        assert_eq!(route.path, "/customers/search?q=john");

        let err = registry
            .resolve(&InvocationRef::new("customers", "search"))
            .unwrap_err();
        assert!(matches!(err, HateoasError::MissingArgument { ref name, .. } if name == "q"));

        let route = registry
            .resolve(
                &InvocationRef::new("customers", "find_all")
                    .arg("page", 2)
                    .arg("size", 20),
            )
            .unwrap();
        assert_eq!(route.path, "/customers?page=2&size=20");

        let route = registry
            .resolve(&InvocationRef::new("customers", "find_all"))
            .unwrap();
        assert_eq!(route.path, "/customers{?page,size}");
    }

    #[test]
    fn test_resolve_body_params_become_input() {
        let registry = create_test_registry();
        let route = registry
            .resolve(
                &InvocationRef::new("customers", "update")
                    .arg("id", "15")
                    .arg("name", "John Doe"),
            )
            .unwrap();

        assert_eq!(route.path, "/customers/15");
        assert_eq!(route.method, Method::PUT);
        assert_eq!(
            route.input,
            vec![
                InputProperty {
                    name: "name".to_string(),
                    required: true
                },
                InputProperty {
                    name: "email".to_string(),
                    required: false
                },
            ]
        );

        let affordance = route.affordance();
        assert_eq!(affordance.http_method(), &Method::PUT);
        assert_eq!(affordance.name(), "update");
        assert_eq!(affordance.input().len(), 2);
    }

    #[test]
    fn test_resolve_errors() {
        let registry = create_test_registry();

        let err = registry
            .resolve(&InvocationRef::new("orders", "find_all"))
            .unwrap_err();
        assert!(matches!(err, HateoasError::UnknownController { .. }));

        let err = registry
            .resolve(&InvocationRef::new("customers", "archive"))
            .unwrap_err();
        assert!(matches!(err, HateoasError::UnknownOperation { .. }));

        let err = registry
            .resolve(&InvocationRef::new("customers", "find_by_id"))
            .unwrap_err();
        assert!(matches!(err, HateoasError::MissingArgument { ref name, .. } if name == "id"));

        let err = registry
            .resolve(
                &InvocationRef::new("customers", "find_by_id")
                    .arg("id", "15")
                    .arg("verbose", true),
            )
            .unwrap_err();
        assert!(matches!(err, HateoasError::UnknownArgument { ref name, .. } if name == "verbose"));
    }

    #[test]
    fn test_resolve_encodes_path_values() {
        let registry = create_test_registry();
        let route = registry
            .resolve(&InvocationRef::new("customers", "find_by_id").arg("id", "a/b c"))
            .unwrap();
        assert_eq!(route.path, "/customers/a%2Fb%20c");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/customers", "/{id}"), "/customers/{id}");
        assert_eq!(join_paths("/customers/", "{id}"), "/customers/{id}");
        assert_eq!(join_paths("/customers", "{/id}"), "/customers{/id}");
        assert_eq!(join_paths("/customers", "orders"), "/customers/orders");
        assert_eq!(join_paths("customers", ""), "/customers");
        assert_eq!(join_paths("", ""), "/");
    }
}
