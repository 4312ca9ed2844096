use crate::database::DbError;
use crate::database::portfolio::favorite::Favorite;
use crate::database::portfolio::portfolio_item::PortfolioItem;
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, Postgres};

pub struct FavoriteStore;

impl FavoriteStore {
    /// Adds a favorite. Returns `None` when the item was already favorited;
    /// the existing row is left untouched.
    pub async fn add(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
        item_id: &str,
    ) -> Result<Option<Favorite>, DbError> {
        Ok(sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorite (user_id, item_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, item_id) DO NOTHING
             RETURNING *",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn remove(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
        item_id: &str,
    ) -> Result<PgQueryResult, DbError> {
        Ok(
            sqlx::query("DELETE FROM favorite WHERE user_id = $1 AND item_id = $2")
                .bind(user_id)
                .bind(item_id)
                .execute(executor)
                .await?,
        )
    }

    /// Retrieves the items a user has favorited, most recent first.
    pub async fn list_items_by_user(
        executor: impl Executor<'_, Database = Postgres>,
        user_id: i32,
    ) -> Result<Vec<PortfolioItem>, DbError> {
        Ok(sqlx::query_as::<_, PortfolioItem>(
            "SELECT pi.*
             FROM favorite f
             JOIN portfolio_item pi ON f.item_id = pi.id
             WHERE f.user_id = $1
             ORDER BY f.added_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?)
    }
}
