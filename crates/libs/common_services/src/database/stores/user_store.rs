use crate::database::DbError;
use crate::database::app_user::{SubscriptionTier, User, UserRole, UserWithPassword};
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, Postgres};

const USER_COLUMNS: &str = "id, created_at, updated_at, email, name, role, subscription, \
     max_items, max_storage_mb, current_storage_used_mb";

pub struct UserStore;

impl UserStore {
    //================================================================================
    // Core User Management
    //================================================================================

    /// Creates a new user with the quota caps for their tier.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
        name: &str,
        hashed_password: &str,
        role: UserRole,
        subscription: SubscriptionTier,
        max_items: Option<i32>,
        max_storage_mb: Option<f64>,
    ) -> Result<User, DbError> {
        let sql = format!(
            "INSERT INTO app_user (email, name, password, role, subscription, max_items, max_storage_mb)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(name)
            .bind(hashed_password)
            .bind(role)
            .bind(subscription)
            .bind(max_items)
            .bind(max_storage_mb)
            .fetch_one(executor)
            .await?)
    }

    //================================================================================
    // Find / Get Methods
    //================================================================================

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
    ) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn find_by_email(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
    ) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn find_by_email_with_password(
        executor: impl Executor<'_, Database = Postgres>,
        email: &str,
    ) -> Result<Option<UserWithPassword>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS}, password FROM app_user WHERE email = $1");
        Ok(sqlx::query_as::<_, UserWithPassword>(&sql)
            .bind(email)
            .fetch_optional(executor)
            .await?)
    }

    /// Retrieves just the role for a specific user ID.
    pub async fn get_user_role(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
    ) -> Result<Option<UserRole>, DbError> {
        Ok(
            sqlx::query_scalar::<_, UserRole>("SELECT role FROM app_user WHERE id = $1")
                .bind(user_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn list_users(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<User>, DbError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM app_user ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(executor).await?)
    }

    /// Returns the first-user check used to bootstrap the initial superadmin.
    pub async fn any_user_exists(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<bool, DbError> {
        Ok(
            sqlx::query_scalar::<_, i32>("SELECT 1 FROM app_user LIMIT 1")
                .fetch_optional(executor)
                .await?
                .is_some(),
        )
    }

    //================================================================================
    // Quota Fields
    //================================================================================

    /// Overwrites a user's quota caps; `None` caps mean unlimited.
    /// The subscription tier is only touched when one is provided.
    pub async fn set_quota(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
        max_items: Option<i32>,
        max_storage_mb: Option<f64>,
        subscription: Option<SubscriptionTier>,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query(
            "UPDATE app_user
             SET max_items = $1,
                 max_storage_mb = $2,
                 subscription = COALESCE($3, subscription),
                 updated_at = now()
             WHERE id = $4",
        )
        .bind(max_items)
        .bind(max_storage_mb)
        .bind(subscription)
        .bind(user_id)
        .execute(executor)
        .await?)
    }

    /// Bulk-overwrites the quota caps of every user with the given role.
    /// Clobbers per-user overrides; that is the documented batch behavior.
    pub async fn set_quota_for_role(
        executor: impl Executor<'_, Database = Postgres>,
        role: UserRole,
        max_items: Option<i32>,
        max_storage_mb: Option<f64>,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query(
            "UPDATE app_user
             SET max_items = $1, max_storage_mb = $2, updated_at = now()
             WHERE role = $3",
        )
        .bind(max_items)
        .bind(max_storage_mb)
        .bind(role)
        .execute(executor)
        .await?)
    }

    /// Atomically adjusts the stored storage usage by `delta_mb` (may be
    /// negative). Always an increment, never an absolute write; the floor
    /// keeps usage from going below zero on deletes.
    pub async fn adjust_storage_used(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
        delta_mb: f64,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query(
            "UPDATE app_user
             SET current_storage_used_mb = GREATEST(0, current_storage_used_mb + $1),
                 updated_at = now()
             WHERE id = $2",
        )
        .bind(delta_mb)
        .bind(user_id)
        .execute(executor)
        .await?)
    }
}
