use crate::api::permissions::interfaces::Collaborator;
use crate::database::DbError;
use crate::database::portfolio::item_permission::{ItemPermission, OwnershipType, PermissionLevel};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, Postgres};

pub struct PermissionStore;

impl PermissionStore {
    //================================================================================
    // Grant Management
    //================================================================================

    /// Inserts a grant for a user on an item, or replaces their existing one.
    ///
    /// The unique constraint on (user_id, item_id) makes this the only write
    /// path that can race, and the database resolves the conflict atomically.
    /// A revoked or expired row is reactivated: `granted_at` is reset and
    /// `is_active` forced back to true.
    pub async fn upsert_grant(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
        user_id: i32,
        ownership_type: OwnershipType,
        permission_level: PermissionLevel,
        granted_by: i32,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ItemPermission, DbError> {
        Ok(sqlx::query_as::<_, ItemPermission>(
            "INSERT INTO item_permission
                 (item_id, user_id, ownership_type, permission_level, granted_by, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, item_id) DO UPDATE SET
                 ownership_type = EXCLUDED.ownership_type,
                 permission_level = EXCLUDED.permission_level,
                 granted_by = EXCLUDED.granted_by,
                 expires_at = EXCLUDED.expires_at,
                 granted_at = now(),
                 is_active = true
             RETURNING *",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(ownership_type)
        .bind(permission_level)
        .bind(granted_by)
        .bind(expires_at)
        .fetch_one(executor)
        .await?)
    }

    /// Records the owner/full grant at item creation time. Idempotent: an
    /// existing row is never overwritten. This is a convenience record; true
    /// ownership is `portfolio_item.user_id`.
    pub async fn insert_owner_grant(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
        user_id: i32,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query(
            "INSERT INTO item_permission
                 (item_id, user_id, ownership_type, permission_level, granted_by)
             VALUES ($1, $2, 'owner', 'full', $2)
             ON CONFLICT (user_id, item_id) DO NOTHING",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(executor)
        .await?)
    }

    /// Soft revoke: the row is kept for audit.
    pub async fn deactivate(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
        user_id: i32,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query(
            "UPDATE item_permission SET is_active = false WHERE item_id = $1 AND user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(executor)
        .await?)
    }

    //================================================================================
    // Find / Get Methods
    //================================================================================

    /// Retrieves the grant row for (user, item) regardless of state; the
    /// caller computes liveness via `ItemPermission::state`.
    pub async fn find_grant(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
        user_id: i32,
    ) -> Result<Option<ItemPermission>, DbError> {
        Ok(sqlx::query_as::<_, ItemPermission>(
            "SELECT * FROM item_permission WHERE item_id = $1 AND user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Retrieves all users holding a live grant on an item, joined with
    /// their name. The expiry check matches the resolver's so the two views
    /// of "who has access" cannot disagree.
    pub async fn list_collaborators(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
    ) -> Result<Vec<Collaborator>, DbError> {
        Ok(sqlx::query_as::<_, Collaborator>(
            "SELECT ip.user_id, u.name, ip.ownership_type, ip.permission_level,
                    ip.granted_at, ip.expires_at
             FROM item_permission ip
             JOIN app_user u ON ip.user_id = u.id
             WHERE ip.item_id = $1
               AND ip.is_active = true
               AND (ip.expires_at IS NULL OR ip.expires_at > now())",
        )
        .bind(item_id)
        .fetch_all(executor)
        .await?)
    }
}
