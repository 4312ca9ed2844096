use crate::database::app_user::{SubscriptionTier, UserRole};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- Response Payloads ---

/// A user's usage measured against their plan limits. `None` caps mean
/// unlimited; paid/unlimited tiers and admins collapse to all-`None` no
/// matter what numbers are stored on their row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserQuotaInfo {
    pub user_id: i32,
    pub role: UserRole,
    pub subscription: SubscriptionTier,
    pub current_items: i64,
    pub current_storage_used_mb: f64,
    pub max_items: Option<i32>,
    pub max_storage_mb: Option<f64>,
    pub items_remaining: Option<i64>,
    pub storage_remaining_mb: Option<f64>,
    pub is_at_item_limit: bool,
    pub is_at_storage_limit: bool,
    pub can_upload: bool,
}

/// Outcome of the upload gate. `reason` is a human-readable upgrade prompt
/// when the gate is closed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadCheck {
    pub can_upload: bool,
    pub reason: Option<String>,
}

/// Aggregate quota usage across all users, for the admin dashboard.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatistics {
    pub total_users: i64,
    pub free_users: i64,
    pub paid_users: i64,
    pub unlimited_users: i64,
    pub users_at_item_limit: i64,
    pub users_at_storage_limit: i64,
    pub total_items: i64,
    pub total_storage_used_mb: f64,
}

/// A free-tier user approaching one of their caps.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearLimitUser {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub current_items: i64,
    pub max_items: Option<i32>,
    pub item_usage: f64,
    pub current_storage_used_mb: f64,
    pub max_storage_mb: Option<f64>,
    pub storage_usage: f64,
}

// --- Request Payloads ---

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetQuotaRequest {
    pub max_items: Option<i32>,
    pub max_storage_mb: Option<f64>,
    pub subscription: Option<SubscriptionTier>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleQuotaRequest {
    pub max_items: Option<i32>,
    pub max_storage_mb: Option<f64>,
}

// --- URL/Query Parameters ---

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadCheckParams {
    /// Size of the prospective upload in megabytes.
    #[serde(default)]
    pub item_size_mb: f64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearLimitParams {
    pub item_threshold: Option<f64>,
    pub storage_threshold: Option<f64>,
}
