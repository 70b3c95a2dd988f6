//! Customer API example
//!
//! Serves a small in-memory customer catalog. Every response carries links
//! built from the controller route table, with affordances describing what
//! the client can do next.
//!
//! ```text
//! cargo run --example customers
//! curl -H 'X-Forwarded-Host: shop.example.com' http://127.0.0.1:3000/customers/15
//! ```

use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use hateoas::prelude::*;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct CustomerController;

impl Controller for CustomerController {
    const NAME: &'static str = "customers";

    fn mapping() -> ControllerMapping {
        ControllerMapping::new(Self::NAME, "/customers")
            .get("find_all", "", [
                ParamMapping::optional_query("page"),
                ParamMapping::optional_query("size"),
            ])
            .get("find_by_id", "/{id}", [ParamMapping::path("id")])
            .get("find_products_by_id", "/{id}/products", [ParamMapping::path("id")])
            .put("update", "/{id}", [
                ParamMapping::path("id"),
                ParamMapping::body("name"),
            ])
            .delete("delete", "/{id}", [ParamMapping::path("id")])
    }
}

impl CustomerController {
    fn find_all() -> Invocation<Self> {
        Self::invoke("find_all")
    }

    fn find_by_id(id: &str) -> Invocation<Self> {
        Self::invoke("find_by_id").arg("id", id)
    }

    fn find_products_by_id(id: &str) -> Invocation<Self> {
        Self::invoke("find_products_by_id").arg("id", id)
    }

    fn update(id: &str) -> Invocation<Self> {
        Self::invoke("update").arg("id", id)
    }

    fn delete(id: &str) -> Invocation<Self> {
        Self::invoke("delete").arg("id", id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Customer {
    id: String,
    name: String,
    products: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerUpdate {
    name: String,
}

#[derive(Debug, Serialize)]
struct CustomerList {
    customers: Vec<Resource<Customer>>,
    links: Links,
}

impl_linkable!(CustomerList);

type Store = HashMap<String, Customer>;

#[derive(Clone)]
struct AppState {
    links: LinkBuilder,
    customers: Arc<RwLock<Store>>,
}

impl AppState {
    fn read_store(&self) -> Result<RwLockReadGuard<'_, Store>, ApiError> {
        self.customers.read().map_err(|_| ApiError::StorePoisoned)
    }

    fn write_store(&self) -> Result<RwLockWriteGuard<'_, Store>, ApiError> {
        self.customers.write().map_err(|_| ApiError::StorePoisoned)
    }
}

enum ApiError {
    NotFound(String),
    StorePoisoned,
    Links(HateoasError),
}

impl From<HateoasError> for ApiError {
    fn from(err: HateoasError) -> Self {
        ApiError::Links(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "code": "NOT_FOUND", "message": format!("No customer {}", id) })),
            )
                .into_response(),
            ApiError::StorePoisoned => {
                tracing::error!("Customer store lock is poisoned");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "code": "STORE_UNAVAILABLE", "message": "Customer store is unavailable" })),
                )
                    .into_response()
            }
            ApiError::Links(err) => err.into_response(),
        }
    }
}

fn customer_resource(links: &LinkBuilder, customer: Customer) -> hateoas::core::Result<Resource<Customer>> {
    let mut resource = Resource::new(customer);
    resource.add_links(links, CustomerController, |links, it| {
        let id = &it.content.id;
        links
            .on(CustomerController::find_by_id(id))?
            .with_self_rel()
            .and_affordances(|a| {
                a.afford(CustomerController::update(id))?;
                a.afford(CustomerController::delete(id))?;
                Ok(())
            })?;
        links
            .on(CustomerController::find_products_by_id(id))?
            .with_rel("products");
        links.on(CustomerController::find_all())?.with_rel("customers");
        Ok(())
    })?;
    Ok(resource)
}

async fn find_all(
    State(state): State<AppState>,
    base_uri: BaseUri,
    Query(paging): Query<HashMap<String, String>>,
) -> Result<Json<CustomerList>, ApiError> {
    let links = state.links.with_base_uri(base_uri);
    let customers: Vec<Customer> = state.read_store()?.values().cloned().collect();

    let mut list = CustomerList {
        customers: customers
            .into_iter()
            .map(|c| customer_resource(&links, c))
            .collect::<hateoas::core::Result<_>>()?,
        links: Links::new(),
    };

    let mut current = CustomerController::find_all();
    for (name, value) in paging.iter().filter(|(k, _)| *k == "page" || *k == "size") {
        current = current.arg(name.clone(), value);
    }
    list.add_links(&links, CustomerController, |links, _| {
        links.on(current)?.with_self_rel();
        Ok(())
    })?;

    Ok(Json(list))
}

async fn find_by_id(
    State(state): State<AppState>,
    base_uri: BaseUri,
    Path(id): Path<String>,
) -> Result<Json<Resource<Customer>>, ApiError> {
    let links = state.links.with_base_uri(base_uri);
    let customer = state
        .read_store()?
        .get(&id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;

    Ok(Json(customer_resource(&links, customer)?))
}

async fn find_products_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let products = state.read_store()?.get(&id).map(|c| c.products.clone());
    products.map(Json).ok_or(ApiError::NotFound(id))
}

async fn update(
    State(state): State<AppState>,
    base_uri: BaseUri,
    Path(id): Path<String>,
    Json(update): Json<CustomerUpdate>,
) -> Result<Json<Resource<Customer>>, ApiError> {
    let links = state.links.with_base_uri(base_uri);
    let customer = state.write_store()?.get_mut(&id).map(|customer| {
        customer.name = update.name;
        customer.clone()
    });

    match customer {
        Some(customer) => {
            tracing::info!(customer = %customer.id, "Customer updated");
            Ok(Json(customer_resource(&links, customer)?))
        }
        None => Err(ApiError::NotFound(id)),
    }
}

async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let removed = state.write_store()?.remove(&id);

    match removed {
        Some(_) => {
            tracing::info!(customer = %id, "Customer deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(id)),
    }
}

fn seed() -> HashMap<String, Customer> {
    [
        ("15", "John Doe", vec!["espresso-machine", "grinder"]),
        ("16", "Jane Roe", vec!["kettle"]),
    ]
    .into_iter()
    .map(|(id, name, products)| {
        (
            id.to_string(),
            Customer {
                id: id.to_string(),
                name: name.to_string(),
                products: products.into_iter().map(str::to_string).collect(),
            },
        )
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(RouteRegistry::new().with::<CustomerController>());
    let state = AppState {
        links: LinkBuilder::new(registry, BaseUri::localhost()),
        customers: Arc::new(RwLock::new(seed())),
    };

    let app = Router::new()
        .route("/customers", get(find_all))
        .route("/customers/{id}", get(find_by_id).put(update).delete(delete))
        .route("/customers/{id}/products", get(find_products_by_id))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

    println!("🌐 Server running on http://127.0.0.1:3000");
    println!("\n  GET    /customers{{?page,size}}        - List customers");
    println!("  GET    /customers/{{id}}                - Get a customer with its links");
    println!("  PUT    /customers/{{id}}                - Rename a customer");
    println!("  DELETE /customers/{{id}}                - Delete a customer");
    println!("  GET    /customers/{{id}}/products       - List a customer's products");

    axum::serve(listener, app).await?;
    Ok(())
}
