use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

/// An explicit permission grant for a user on a portfolio item.
///
/// At most one row exists per (user, item) pair; the unique constraint backs
/// the upsert in `PermissionStore`. Revocation and expiry are soft: the row
/// is kept for audit and its state is computed at read time.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPermission {
    pub id: i64,
    pub item_id: String,
    pub user_id: i32,
    pub ownership_type: OwnershipType,
    pub permission_level: PermissionLevel,
    pub granted_by: i32,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Maps to the `ownership_type` Postgres enum.
///
/// Classifies the grant's relationship to the item; distinct from the
/// permission level. A `full` grant on a `collaborator` row still does not
/// confer delete or re-grant rights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "ownership_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OwnershipType {
    Owner,
    Collaborator,
}

impl fmt::Display for OwnershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Owner => "owner",
            Self::Collaborator => "collaborator",
        };
        f.write_str(s)
    }
}

/// Maps to the `permission_level` Postgres enum.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default, ToSchema,
)]
#[sqlx(type_name = "permission_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    None,
    View,
    Comment,
    Edit,
    Full,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::View => "view",
            Self::Comment => "comment",
            Self::Edit => "edit",
            Self::Full => "full",
        };
        f.write_str(s)
    }
}

/// The effective state of a grant, computed at read time from
/// (`is_active`, `expires_at`). Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
    Active,
    Revoked,
    Expired,
}

impl ItemPermission {
    /// Single source of truth for the soft-revoke / soft-expiry duality.
    /// Everything that reads grants (the resolver, collaborator listings)
    /// goes through this so the two cannot diverge.
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> GrantState {
        if !self.is_active {
            return GrantState::Revoked;
        }
        match self.expires_at {
            Some(expires_at) if expires_at <= now => GrantState::Expired,
            _ => GrantState::Active,
        }
    }

    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == GrantState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(is_active: bool, expires_at: Option<DateTime<Utc>>) -> ItemPermission {
        ItemPermission {
            id: 1,
            item_id: "item".to_string(),
            user_id: 2,
            ownership_type: OwnershipType::Collaborator,
            permission_level: PermissionLevel::Edit,
            granted_by: 3,
            granted_at: Utc::now(),
            expires_at,
            is_active,
        }
    }

    #[test]
    fn test_active_without_expiry() {
        let now = Utc::now();
        assert_eq!(grant(true, None).state(now), GrantState::Active);
    }

    #[test]
    fn test_active_with_future_expiry() {
        let now = Utc::now();
        let g = grant(true, Some(now + Duration::hours(1)));
        assert_eq!(g.state(now), GrantState::Active);
        assert!(g.is_live(now));
    }

    #[test]
    fn test_expired_even_though_active_flag_is_set() {
        let now = Utc::now();
        let g = grant(true, Some(now - Duration::seconds(1)));
        assert_eq!(g.state(now), GrantState::Expired);
        assert!(!g.is_live(now));
    }

    #[test]
    fn test_revoked_takes_precedence_over_expiry() {
        let now = Utc::now();
        let g = grant(false, Some(now - Duration::hours(1)));
        assert_eq!(g.state(now), GrantState::Revoked);
    }
}
