use crate::api::permissions::interfaces::{Collaborator, ItemCapabilities};
use crate::database::portfolio::portfolio_item::PortfolioItem;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- Request Payloads ---

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub marketplace_url: Option<String>,
    pub token_contract: Option<String>,
    pub token_id: Option<String>,
    /// Size of the uploaded artwork in megabytes, counted against the
    /// owner's storage quota.
    #[serde(default)]
    pub file_size_mb: f64,
    pub is_public: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub marketplace_url: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

// --- URL/Query Parameters ---

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPublicParams {
    pub category: Option<String>,
}

// --- Response Payloads ---

/// Full details of an item, including the caller's resolved capabilities and
/// the item's collaborators.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailsResponse {
    #[serde(flatten)]
    pub item: PortfolioItem,
    pub capabilities: ItemCapabilities,
    pub collaborators: Vec<Collaborator>,
}

/// Claims carried by an item share link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShareClaims {
    pub iss: String, // Issuer (server's public_url)
    pub sub: String, // Subject (item_id)
    pub exp: i64,    // Expiration time (as a Unix timestamp)
    pub sharer_name: String,
}
