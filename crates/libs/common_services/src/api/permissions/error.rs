use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Database error")]
    Database(#[from] DbError),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

fn log_error(error: &PermissionError) {
    match error {
        PermissionError::Database(e) => warn!("Permissions -> Database query failed: {e}"),
        PermissionError::Forbidden(message) => warn!("Permissions -> Forbidden: {message}"),
    }
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, format!("Forbidden: {message}")),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
