use crate::database::DbError;
use crate::database::portfolio::portfolio_item::{NewPortfolioItem, PortfolioItem};
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, Postgres};

pub struct ItemStore;

impl ItemStore {
    //================================================================================
    // Core Item Management
    //================================================================================

    /// Inserts a new portfolio item owned by `item.user_id`.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        item: &NewPortfolioItem,
    ) -> Result<PortfolioItem, DbError> {
        Ok(sqlx::query_as::<_, PortfolioItem>(
            "INSERT INTO portfolio_item
                 (id, user_id, title, description, category, marketplace_url,
                  token_contract, token_id, file_size_mb, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(&item.id)
        .bind(item.user_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.marketplace_url)
        .bind(&item.token_contract)
        .bind(&item.token_id)
        .bind(item.file_size_mb)
        .bind(item.is_public)
        .fetch_one(executor)
        .await?)
    }

    /// Updates the details of a specific item.
    ///
    /// Pass `None` for fields that should remain unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
        title: Option<String>,
        description: Option<String>,
        category: Option<String>,
        marketplace_url: Option<String>,
        is_public: Option<bool>,
    ) -> Result<PortfolioItem, DbError> {
        Ok(sqlx::query_as::<_, PortfolioItem>(
            "UPDATE portfolio_item
             SET
                 title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 category = COALESCE($3, category),
                 marketplace_url = COALESCE($4, marketplace_url),
                 is_public = COALESCE($5, is_public),
                 updated_at = now()
             WHERE id = $6
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(marketplace_url)
        .bind(is_public)
        .bind(item_id)
        .fetch_one(executor)
        .await?)
    }

    /// Deletes an item; its permissions and favorites cascade.
    pub async fn delete(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
    ) -> Result<PgQueryResult, DbError> {
        Ok(sqlx::query("DELETE FROM portfolio_item WHERE id = $1")
            .bind(item_id)
            .execute(executor)
            .await?)
    }

    //================================================================================
    // Find / Get Methods
    //================================================================================

    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
    ) -> Result<Option<PortfolioItem>, DbError> {
        Ok(
            sqlx::query_as::<_, PortfolioItem>("SELECT * FROM portfolio_item WHERE id = $1")
                .bind(item_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Retrieves just the owner for a specific item ID.
    pub async fn find_owner_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
    ) -> Result<Option<i32>, DbError> {
        Ok(
            sqlx::query_scalar::<_, i32>("SELECT user_id FROM portfolio_item WHERE id = $1")
                .bind(item_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    /// Retrieves just the stored file size for a specific item ID.
    pub async fn find_file_size_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        item_id: &str,
    ) -> Result<Option<f64>, DbError> {
        Ok(
            sqlx::query_scalar::<_, f64>("SELECT file_size_mb FROM portfolio_item WHERE id = $1")
                .bind(item_id)
                .fetch_optional(executor)
                .await?,
        )
    }

    pub async fn list_by_user(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
    ) -> Result<Vec<PortfolioItem>, DbError> {
        Ok(sqlx::query_as::<_, PortfolioItem>(
            "SELECT * FROM portfolio_item WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?)
    }

    /// Lists public items, optionally filtered by category.
    pub async fn list_public(
        executor: impl Executor<'_, Database = Postgres>,
        category: Option<&str>,
    ) -> Result<Vec<PortfolioItem>, DbError> {
        Ok(sqlx::query_as::<_, PortfolioItem>(
            "SELECT * FROM portfolio_item
             WHERE is_public = true AND ($1::TEXT IS NULL OR category = $1)
             ORDER BY created_at DESC",
        )
        .bind(category)
        .fetch_all(executor)
        .await?)
    }

    //================================================================================
    // Quota Support
    //================================================================================

    /// Live count of a user's items; quota checks never trust a cached
    /// counter for this.
    pub async fn count_by_user(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
    ) -> Result<i64, DbError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM portfolio_item WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(executor)
                .await?,
        )
    }

    /// Item counts for all users in one grouped query, for joining in memory
    /// against the user list instead of issuing a count per user.
    pub async fn count_grouped_by_user(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<(i32, i64)>, DbError> {
        Ok(sqlx::query_as::<_, (i32, i64)>(
            "SELECT user_id, COUNT(*) FROM portfolio_item GROUP BY user_id",
        )
        .fetch_all(executor)
        .await?)
    }
}
