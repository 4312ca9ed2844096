use crate::database::portfolio::item_permission::{OwnershipType, PermissionLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Request Payloads ---

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionRequest {
    pub user_id: i32,
    pub ownership_type: OwnershipType,
    pub permission_level: PermissionLevel,
    pub expires_at: Option<DateTime<Utc>>,
}

// --- Response Payloads ---

/// The capability set a requesting user holds for one item, with the
/// resolved ownership classification and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemCapabilities {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
    pub can_grant_permissions: bool,
    pub ownership_type: Option<OwnershipType>,
    pub permission_level: PermissionLevel,
}

impl ItemCapabilities {
    /// The lattice bottom: no access at all. Also the result for any lookup
    /// failure (missing item, failed query).
    #[must_use]
    pub const fn none() -> Self {
        Self {
            can_view: false,
            can_edit: false,
            can_delete: false,
            can_share: false,
            can_grant_permissions: false,
            ownership_type: None,
            permission_level: PermissionLevel::None,
        }
    }

    /// Browse-only access: anonymous visitors and the `visitor` role.
    #[must_use]
    pub const fn view_only() -> Self {
        Self {
            can_view: true,
            can_edit: false,
            can_delete: false,
            can_share: false,
            can_grant_permissions: false,
            ownership_type: None,
            permission_level: PermissionLevel::View,
        }
    }

    /// Everything, as held by the item's owner.
    #[must_use]
    pub const fn owner_full() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: true,
            can_share: true,
            can_grant_permissions: true,
            ownership_type: Some(OwnershipType::Owner),
            permission_level: PermissionLevel::Full,
        }
    }
}

/// A user holding a live grant on an item.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: i32,
    pub name: String,
    pub ownership_type: OwnershipType,
    pub permission_level: PermissionLevel,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// An action that can be checked against a user's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    View,
    Edit,
    Delete,
    Share,
    GrantPermissions,
}

impl ItemCapabilities {
    #[must_use]
    pub const fn allows(&self, action: ItemAction) -> bool {
        match action {
            ItemAction::View => self.can_view,
            ItemAction::Edit => self.can_edit,
            ItemAction::Delete => self.can_delete,
            ItemAction::Share => self.can_share,
            ItemAction::GrantPermissions => self.can_grant_permissions,
        }
    }
}
