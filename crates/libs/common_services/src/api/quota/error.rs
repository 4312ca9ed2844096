use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Database error")]
    Database(#[from] DbError),

    #[error("User not found: {0}")]
    UserNotFound(i32),
}

fn log_error(error: &QuotaError) {
    match error {
        QuotaError::Database(e) => warn!("Quota -> Database query failed: {e}"),
        QuotaError::UserNotFound(user_id) => warn!("Quota -> User not found: {user_id}"),
    }
}

impl IntoResponse for QuotaError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::UserNotFound(user_id) => {
                (StatusCode::NOT_FOUND, format!("User not found: {user_id}"))
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
