//! Database configuration for PostgreSQL connection.

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{AppError, AppResult};

/// Database configuration loaded from environment variables.
///
/// Environment variables are prefixed with `POSTGRES_`:
/// - `POSTGRES_HOST`: Database host (default: "localhost")
/// - `POSTGRES_PORT`: Database port (default: 5432)
/// - `POSTGRES_USER`: Database user (default: "user_center")
/// - `POSTGRES_PASSWORD`: Database password
/// - `POSTGRES_DATABASE`: Database name (default: "user_center")
/// - `POSTGRES_SCHEMA`: Schema holding the `users` table (default: "user_center")
///
/// The schema is put on each connection's `search_path`, so queries name
/// tables without a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database host
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database user
    #[serde(default = "default_user")]
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Schema for the user tables, created at startup when missing
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Maximum connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "user_center".to_string()
}

fn default_database() -> String {
    "user_center".to_string()
}

fn default_schema() -> String {
    "user_center".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

impl DatabaseConfig {
    /// Load configuration from environment variables prefixed with `POSTGRES_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("POSTGRES_").from_env::<DatabaseConfig>()
    }

    /// The configured schema, if it is a plain lowercase identifier.
    ///
    /// The name is spliced into DDL, so anything needing quoting is refused.
    pub fn schema_name(&self) -> AppResult<&str> {
        let mut chars = self.schema.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && self.schema.len() <= 63;
        if valid {
            Ok(&self.schema)
        } else {
            Err(AppError::Config(format!(
                "invalid POSTGRES_SCHEMA '{}'",
                self.schema
            )))
        }
    }

    /// Connection options with the user schema first on the search path.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name("user-center")
            .options([("search_path", self.schema.as_str())])
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            schema: default_schema(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout: default_acquire_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "user_center");
        assert_eq!(config.schema_name().unwrap(), "user_center");
    }

    #[test]
    fn test_connect_options() {
        let config = DatabaseConfig {
            port: 6543,
            database: "accounts".to_string(),
            ..DatabaseConfig::default()
        };
        let options = config.connect_options();
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("accounts"));
        assert_eq!(options.get_application_name(), Some("user-center"));
    }

    #[test]
    fn test_schema_name_must_be_plain_identifier() {
        for schema in ["accounts", "_uc2", "user_center"] {
            let config = DatabaseConfig {
                schema: schema.to_string(),
                ..DatabaseConfig::default()
            };
            assert_eq!(config.schema_name().unwrap(), schema);
        }
        for schema in ["", "2fast", "Users", "uc; DROP TABLE users", "a-b"] {
            let config = DatabaseConfig {
                schema: schema.to_string(),
                ..DatabaseConfig::default()
            };
            assert!(matches!(config.schema_name(), Err(AppError::Config(_))));
        }
    }
}
