use crate::database::DbError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Invalid share token: {0}")]
    InvalidShareToken(String),
}

fn log_error(error: &ItemError) {
    match error {
        ItemError::Database(e) => warn!("Database query failed: {e}"),
        ItemError::Internal(e) => warn!("Internal error: {e:?}"),
        ItemError::NotFound(id) => warn!("Item -> Not found: {id}"),
        ItemError::QuotaExceeded(reason) => warn!("Item -> Quota exceeded: {reason}"),
        ItemError::InvalidShareToken(reason) => warn!("Invalid share token: {reason}"),
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, format!("Item not found: {message}"))
            }
            Self::QuotaExceeded(message) => (StatusCode::FORBIDDEN, message),
            Self::InvalidShareToken(message) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid share link: {message}"),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for ItemError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}

impl From<DbError> for ItemError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(sql_err) => {
                if matches!(sql_err, sqlx::Error::RowNotFound) {
                    Self::NotFound("row not found".into())
                } else {
                    Self::Database(sql_err)
                }
            }
        }
    }
}

impl From<crate::api::permissions::error::PermissionError> for ItemError {
    fn from(err: crate::api::permissions::error::PermissionError) -> Self {
        match err {
            crate::api::permissions::error::PermissionError::Database(db) => db.into(),
            crate::api::permissions::error::PermissionError::Forbidden(message) => {
                Self::NotFound(message)
            }
        }
    }
}
