use crate::database::DbError;
use crate::database::category::Category;
use sqlx::{Executor, Postgres};

pub struct CategoryStore;

impl CategoryStore {
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, DbError> {
        Ok(sqlx::query_as::<_, Category>(
            "INSERT INTO category (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?)
    }

    pub async fn list(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<Category>, DbError> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT * FROM category ORDER BY name")
                .fetch_all(executor)
                .await?,
        )
    }
}
