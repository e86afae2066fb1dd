//! Schema bootstrap for the users table.

use crate::db::DbPool;
use crate::error::AppResult;

/// Table and index statements, run after the schema exists; each is
/// idempotent. Names resolve through the connection's `search_path`.
///
/// The partial unique index keeps accounts unique among live users, which
/// closes the gap between the service's count check and its insert.
const TABLE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id           BIGSERIAL PRIMARY KEY,
        user_account VARCHAR(256) NOT NULL,
        user_password VARCHAR(512) NOT NULL,
        user_name    VARCHAR(256) NOT NULL DEFAULT 'user',
        user_profile VARCHAR(512),
        user_role    VARCHAR(32)  NOT NULL DEFAULT 'user',
        edit_time    TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        create_time  TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        update_time  TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        is_delete    BOOLEAN      NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS users_account_live_uidx
        ON users (user_account)
        WHERE is_delete = FALSE
    "#,
    "CREATE INDEX IF NOT EXISTS users_name_idx ON users (user_name)",
];

/// Create `schema` and the users table in it if they are missing.
///
/// `schema` must already be a validated identifier
/// (see [`DatabaseConfig::schema_name`](crate::config::DatabaseConfig::schema_name)).
pub async fn ensure_schema(pool: &DbPool, schema: &str) -> AppResult<()> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    for statement in TABLE_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "User schema ready");
    Ok(())
}
