//! Health and API metadata endpoints.

use axum::Json;
use serde_json::{json, Value};
use utoipa::OpenApi;

use crate::ApiDoc;

/// Liveness probe.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service is up")))]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
