//! Integration tests for route configuration loading and merging

use hateoas::prelude::*;
use std::io::Write;

const CUSTOMERS_YAML: &str = r#"
controllers:
  - name: customers
    base_path: /customers
    operations:
      - name: find_by_id
        method: GET
        path: /{id}
        params:
          - { name: id, binding: path }
      - name: delete
        method: DELETE
        path: /{id}
        params:
          - { name: id, binding: path }
"#;

const ORDERS_YAML: &str = r#"
controllers:
  - name: orders
    base_path: /orders
    operations:
      - name: find_all
        method: GET
        path: ""
        params:
          - { name: status, binding: query, required: false }
"#;

#[test]
fn test_merge_empty_configs() {
    let merged = RoutesConfig::merge(vec![]);
    assert!(merged.controllers.is_empty());
}

#[test]
fn test_merge_multiple_configs_no_overlap() {
    let customers = RoutesConfig::from_yaml_str(CUSTOMERS_YAML).unwrap();
    let orders = RoutesConfig::from_yaml_str(ORDERS_YAML).unwrap();

    let merged = RoutesConfig::merge(vec![customers, orders]);

    let names: Vec<&str> = merged.controllers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders"]);
}

#[test]
fn test_merge_later_definition_wins() {
    let override_yaml = r#"
controllers:
  - name: customers
    base_path: /api/customers
    operations:
      - name: find_by_id
        method: GET
        path: /{id}
        params:
          - { name: id, binding: path }
"#;

    let merged = RoutesConfig::merge(vec![
        RoutesConfig::from_yaml_str(CUSTOMERS_YAML).unwrap(),
        RoutesConfig::from_yaml_str(ORDERS_YAML).unwrap(),
        RoutesConfig::from_yaml_str(override_yaml).unwrap(),
    ]);

    assert_eq!(merged.controllers.len(), 2);
    assert_eq!(merged.controllers[0].name, "customers");

    let customers = merged.find_controller("customers").unwrap();
    assert_eq!(customers.base_path, "/api/customers");
    assert!(customers.find_operation("delete").is_none());
}

#[test]
fn test_registry_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CUSTOMERS_YAML.as_bytes()).unwrap();

    let path = file.path().to_str().unwrap();
    let config = RoutesConfig::from_yaml_file(path).unwrap();
    let registry = RouteRegistry::from_config(&config);

    assert_eq!(registry.controllers(), vec!["customers"]);

    let links = LinkBuilder::new(Arc::new(registry), BaseUri::localhost());
    let link = links
        .link_to(InvocationRef::new("customers", "find_by_id").arg("id", 15))
        .unwrap()
        .with_self_rel();
    let link = links
        .and_affordance(&link, InvocationRef::new("customers", "delete").arg("id", 15))
        .unwrap();

    assert_eq!(link.href(), "http://localhost/customers/15");
    assert_eq!(link.affordances()[1].http_method(), &Method::DELETE);
}

#[test]
fn test_configured_optional_query_stays_templated() {
    let config = RoutesConfig::from_yaml_str(ORDERS_YAML).unwrap();
    let links = LinkBuilder::new(
        Arc::new(RouteRegistry::from_config(&config)),
        BaseUri::new("https://shop.example.com").unwrap(),
    );

    let all = links
        .link_to(InvocationRef::new("orders", "find_all"))
        .unwrap()
        .with_rel("orders");
    assert_eq!(all.href(), "https://shop.example.com/orders{?status}");

    let open = links
        .link_to(InvocationRef::new("orders", "find_all").arg("status", "open"))
        .unwrap()
        .with_rel("open-orders");
    assert_eq!(open.href(), "https://shop.example.com/orders?status=open");
}
