use axum::Json;
use serde_json::{Value, json};

/// Health check.
#[utoipa::path(
    get,
    path = "/",
    tag = "Root",
    responses(
        (status = 200, description = "Service is up."),
    )
)]
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
