use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// Represents a user in the application.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub subscription: SubscriptionTier,
    /// `None` means unlimited.
    pub max_items: Option<i32>,
    /// `None` means unlimited.
    pub max_storage_mb: Option<f64>,
    pub current_storage_used_mb: f64,
}

/// Represents a user record from db, including the password hash.
#[derive(Debug, FromRow)]
pub struct UserWithPassword {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub subscription: SubscriptionTier,
    pub max_items: Option<i32>,
    pub max_storage_mb: Option<f64>,
    pub current_storage_used_mb: f64,
    pub password: String,
}

/// Maps to the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Visitor,
    Collector,
    Creator,
    Admin,
    Superadmin,
}

impl UserRole {
    /// Admin override predicate. Kept separate from capability resolution so
    /// the override never leaks into the level/ownership table.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Visitor => "visitor",
            Self::Collector => "collector",
            Self::Creator => "creator",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        };
        f.write_str(s)
    }
}

/// Maps to the `subscription_tier` Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Paid,
    Unlimited,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Unlimited => "unlimited",
        };
        f.write_str(s)
    }
}
