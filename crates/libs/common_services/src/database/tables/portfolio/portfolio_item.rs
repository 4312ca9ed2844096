use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents a single portfolio item in the database.
///
/// `user_id` is the uploader and immutable owner; collaboration happens
/// through `item_permission` rows layered on top.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub marketplace_url: Option<String>,
    pub token_contract: Option<String>,
    pub token_id: Option<String>,
    pub file_size_mb: f64,
    pub is_public: bool,
}

/// Data required to insert a new portfolio item.
#[derive(Debug)]
pub struct NewPortfolioItem {
    pub id: String,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub marketplace_url: Option<String>,
    pub token_contract: Option<String>,
    pub token_id: Option<String>,
    pub file_size_mb: f64,
    pub is_public: bool,
}
