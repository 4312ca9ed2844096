use crate::api::permissions::error::PermissionError;
use crate::api::permissions::interfaces::{Collaborator, ItemAction, ItemCapabilities};
use crate::api::permissions::resolver::{Requester, ResolveInput, resolve_item_capabilities};
use crate::database::DbError;
use crate::database::app_user::User;
use crate::database::item_store::ItemStore;
use crate::database::permission_store::PermissionStore;
use crate::database::portfolio::item_permission::{OwnershipType, PermissionLevel};
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use tracing::{error, instrument, warn};

/// Resolves the capability set for a (possibly anonymous) user on an item.
///
/// Never fails: a missing item or a failed lookup yields the no-permission
/// bottom, with the underlying error logged. Callers can always treat the
/// result as authoritative-and-safe.
#[instrument(skip(pool, user))]
pub async fn get_user_item_permissions(
    pool: &PgPool,
    item_id: &str,
    user: Option<&User>,
) -> ItemCapabilities {
    match load_capabilities(pool, item_id, user).await {
        Ok(capabilities) => capabilities,
        Err(e) => {
            error!("Capability resolution failed for item {item_id}: {e}");
            ItemCapabilities::none()
        }
    }
}

async fn load_capabilities(
    pool: &PgPool,
    item_id: &str,
    user: Option<&User>,
) -> Result<ItemCapabilities, DbError> {
    let Some(item_owner_id) = ItemStore::find_owner_by_id(pool, item_id).await? else {
        return Ok(ItemCapabilities::none());
    };

    // Visitors and owners short-circuit before the grant matters, but the
    // row is cheap to fetch and keeps resolution a single pure call.
    let grant = match user {
        Some(user) => PermissionStore::find_grant(pool, item_id, user.id).await?,
        None => None,
    };

    let requester = user.map(|user| Requester {
        user_id: user.id,
        role: user.role,
    });

    Ok(resolve_item_capabilities(&ResolveInput {
        requester,
        item_owner_id,
        grant: grant.as_ref(),
        now: Utc::now(),
    }))
}

/// Checks a single action, applying the admin override first: admins and
/// superadmins may do anything, without consulting the capability table.
#[instrument(skip(pool, user))]
pub async fn can_user_perform_action(
    pool: &PgPool,
    item_id: &str,
    user: Option<&User>,
    action: ItemAction,
) -> bool {
    if let Some(user) = user
        && user.role.is_admin()
    {
        return true;
    }
    get_user_item_permissions(pool, item_id, user)
        .await
        .allows(action)
}

/// Grants (or replaces) a permission for `target_user_id` on an item.
///
/// The granter must be an admin or currently hold `can_grant_permissions`.
/// Returns whether the grant was written; authorization failures and
/// persistence failures are logged, never propagated.
#[instrument(skip(pool, granted_by))]
pub async fn grant_permission(
    pool: &PgPool,
    item_id: &str,
    target_user_id: i32,
    granted_by: &User,
    ownership_type: OwnershipType,
    permission_level: PermissionLevel,
    expires_at: Option<DateTime<Utc>>,
) -> bool {
    if !can_user_perform_action(pool, item_id, Some(granted_by), ItemAction::GrantPermissions).await
    {
        warn!(
            "User {} may not grant permissions on item {item_id}",
            granted_by.id
        );
        return false;
    }

    match PermissionStore::upsert_grant(
        pool,
        item_id,
        target_user_id,
        ownership_type,
        permission_level,
        granted_by.id,
        expires_at,
    )
    .await
    {
        Ok(_) => true,
        Err(e) => {
            error!("Failed to grant permission on item {item_id}: {e}");
            false
        }
    }
}

/// Soft-revokes a grant: `is_active` goes false, the row stays for audit.
/// Same authorization gate as granting. Returns false when the caller is
/// not authorized, when no grant row exists, or on a persistence failure.
#[instrument(skip(pool, revoked_by))]
pub async fn revoke_permission(
    pool: &PgPool,
    item_id: &str,
    target_user_id: i32,
    revoked_by: &User,
) -> bool {
    if !can_user_perform_action(pool, item_id, Some(revoked_by), ItemAction::GrantPermissions).await
    {
        warn!(
            "User {} may not revoke permissions on item {item_id}",
            revoked_by.id
        );
        return false;
    }

    match PermissionStore::deactivate(pool, item_id, target_user_id).await {
        Ok(result) if result.rows_affected() > 0 => true,
        Ok(_) => {
            warn!("No grant row for user {target_user_id} on item {item_id} to revoke");
            false
        }
        Err(e) => {
            error!("Failed to revoke permission on item {item_id}: {e}");
            false
        }
    }
}

/// Records the owner/full permission row at upload time. Idempotent; runs
/// inside the item-creation transaction, so failures propagate and abort
/// the upload as a whole.
pub async fn grant_ownership_on_upload(
    executor: impl Executor<'_, Database = Postgres>,
    item_id: &str,
    user_id: i32,
) -> Result<(), DbError> {
    PermissionStore::insert_owner_grant(executor, item_id, user_id).await?;
    Ok(())
}

/// Lists all users holding a live grant on the item, with their names.
#[instrument(skip(pool))]
pub async fn get_item_collaborators(
    pool: &PgPool,
    item_id: &str,
) -> Result<Vec<Collaborator>, PermissionError> {
    Ok(PermissionStore::list_collaborators(pool, item_id).await?)
}
