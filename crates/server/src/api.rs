//! HTTP surface of the back office.
//!
//! - `GET    /products`                       list products (`orderBy=asc|desc`)
//! - `POST   /products`                       create a product
//! - `PUT    /products/{id}`                  partially update a product
//! - `DELETE /products/{id}`                  delete a product and its recipe
//! - `GET    /products/{id}/raw-materials`    list a product's recipe
//! - `POST   /products/{id}/raw-materials`    link a raw material to a product
//! - `GET    /raw-materials` (+ POST/PUT/DELETE as for products)
//! - `GET    /production/suggestions`         run the production planner

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use autoflex_core::errors::{ApplicationError, InterfaceError};
use autoflex_core::production::ProductionService;
use autoflex_db::{CatalogService, RepositoryProductionSource};

use crate::{catalog, production};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub production: Arc<ProductionService<RepositoryProductionSource>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route("/products/{id}", put(catalog::update_product).delete(catalog::delete_product))
        .route(
            "/products/{id}/raw-materials",
            get(catalog::list_recipe).post(catalog::add_recipe_line),
        )
        .route(
            "/raw-materials",
            get(catalog::list_raw_materials).post(catalog::create_raw_material),
        )
        .route(
            "/raw-materials/{id}",
            put(catalog::update_raw_material).delete(catalog::delete_raw_material),
        )
        .route("/production/suggestions", get(production::suggestions))
        .with_state(state)
}

/// `{ count, data }` envelope used by every listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Listing<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(data: Vec<T>) -> Self {
        Self { count: data.len(), data }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody { status: "error", message: self.0.public_message().to_string() }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(value: ApplicationError) -> Self {
        Self(value.into_interface(Uuid::new_v4().to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                event_name = "http.request.failed",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        } else {
            warn!(
                event_name = "http.request.rejected",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request rejected"
            );
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::IntoResponse,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use autoflex_core::errors::{ApplicationError, DomainError};
    use autoflex_core::production::ProductionService;
    use autoflex_db::{
        connect_with_settings, migrations, CatalogRepositories, CatalogService,
        RepositoryProductionSource,
    };

    use super::{router, ApiError, AppState};

    pub(crate) fn in_memory_state() -> AppState {
        let repositories = CatalogRepositories::in_memory();
        AppState {
            catalog: CatalogService::new(repositories.clone()),
            production: Arc::new(ProductionService::new(RepositoryProductionSource::new(
                repositories,
            ))),
        }
    }

    async fn sql_state() -> AppState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repositories = CatalogRepositories::sql(pool);
        AppState {
            catalog: CatalogService::new(repositories.clone()),
            production: Arc::new(ProductionService::new(RepositoryProductionSource::new(
                repositories,
            ))),
        }
    }

    async fn send(
        app: axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response =
            app.oneshot(request.body(body).expect("request")).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, payload)
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::NotFound("Product not found".into()), StatusCode::NOT_FOUND),
            (DomainError::Conflict("taken".into()), StatusCode::CONFLICT),
        ];

        for (error, expected) in cases {
            let api = ApiError::from(ApplicationError::Domain(error));
            assert_eq!(api.status(), expected);
        }
        let unavailable = ApiError::from(ApplicationError::Persistence("locked".into()));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unavailable.body().status, "error");
        assert!(!unavailable.body().message.contains("locked"));
    }

    #[tokio::test]
    async fn error_response_uses_status_envelope() {
        let not_found = DomainError::NotFound("Product not found".into());
        let response = ApiError::from(ApplicationError::Domain(not_found)).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(payload, json!({ "status": "error", "message": "Product not found" }));
    }

    #[tokio::test]
    async fn catalog_round_trip_over_http() {
        let app = router(sql_state().await);

        let (status, table) = send(
            app.clone(),
            "POST",
            "/products",
            Some(json!({ "code": "TB-01", "name": "Table", "value": 150 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let table_id = table["id"].as_str().expect("product id").to_string();

        let (status, wood) = send(
            app.clone(),
            "POST",
            "/raw-materials",
            Some(json!({ "code": "WD", "name": "Wood", "quantity_stock": "20" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let wood_id = wood["id"].as_str().expect("raw material id").to_string();

        let (status, line) = send(
            app.clone(),
            "POST",
            &format!("/products/{table_id}/raw-materials"),
            Some(json!({ "raw_material_id": wood_id, "quantity_needed": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(line["raw_material_name"], "Wood");

        let (status, recipe) =
            send(app.clone(), "GET", &format!("/products/{table_id}/raw-materials"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recipe["count"], 1);

        let (status, plan) = send(app.clone(), "GET", "/production/suggestions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["productsAnalyzed"], 1);
        assert_eq!(plan["suggestions"][0]["quantity_possible"], 3);
        assert_eq!(plan["totalProductionValue"], "450");

        let (status, body) =
            send(app.clone(), "DELETE", &format!("/products/{table_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (_, recipe) =
            send(app, "GET", &format!("/products/{table_id}/raw-materials"), None).await;
        assert_eq!(recipe["count"], 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = router(in_memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/products")
                    .header("content-type", "application/json")
                    .body(Body::from("{ not json"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = send(router(in_memory_state()), "GET", "/recipes", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
