use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user's favorite on a portfolio item. Independent of permissions: any
/// authenticated user may favorite any item they can view.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub user_id: i32,
    pub item_id: String,
    pub added_at: DateTime<Utc>,
}
