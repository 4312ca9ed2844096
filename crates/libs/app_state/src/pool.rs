use crate::{constants, settings};
use color_eyre::Result;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

/// Connect to Postgres using the configured pool limits.
pub async fn get_db_pool() -> Result<PgPool> {
    let db = &constants().database;
    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .min_connections(db.min_connections)
        .max_lifetime(Duration::from_secs(db.max_lifetime))
        .idle_timeout(Duration::from_secs(db.idle_timeout))
        .acquire_timeout(Duration::from_secs(db.acquire_timeout))
        .connect(&settings().secrets.database_url)
        .await?;

    info!("Connected to database");
    Ok(pool)
}
