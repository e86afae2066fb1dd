//! PostgreSQL pool for the user store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;

pub type DbPool = PgPool;

/// Connect the pool. Every connection starts with the configured schema
/// on its `search_path`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(
        host = %config.host,
        database = %config.database,
        schema = %config.schema,
        max_connections = config.max_connections,
        "User store connected"
    );

    Ok(pool)
}

/// Whether the `users` table answers a trivial query.
pub async fn health_check(pool: &DbPool) -> bool {
    match sqlx::query("SELECT 1 FROM users LIMIT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "User store health check failed");
            false
        }
    }
}
