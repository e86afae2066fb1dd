//! Application configuration for the User Center server.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Where user records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through the sqlx pool
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// Application configuration.
///
/// Loaded from environment variables prefixed with `USER_CENTER_`:
/// - `USER_CENTER_HOST`: Server bind address (default: "0.0.0.0")
/// - `USER_CENTER_PORT`: Server port (default: 9090)
/// - `USER_CENTER_STORAGE`: `postgres` or `memory` (default: postgres)
/// - `USER_CENTER_CORS_ALLOWED_ORIGINS`: Comma-separated origins
/// - `USER_CENTER_PASSWORD_SALT`: Salt prepended before hashing passwords
/// - `USER_CENTER_SESSION_COOKIE`: Session cookie name
/// - `USER_CENTER_SESSION_TTL_SECS`: Idle session lifetime
/// - `USER_CENTER_SESSION_SWEEP_INTERVAL`: Seconds between expired-session sweeps
///
/// When `USER_CENTER_CONFIG` names a TOML, JSON or YAML file, that file is
/// used instead of the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Storage backend for user records
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// Origins allowed to call the API with credentials
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Salt prepended to every password before digesting.
    /// Changing it invalidates every stored password.
    #[serde(default = "default_password_salt")]
    pub password_salt: String,

    /// Session cookie name
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Idle session lifetime in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Expired-session sweep interval in seconds
    #[serde(default = "default_session_sweep_interval")]
    pub session_sweep_interval: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_storage() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_password_salt() -> String {
    "lilac".to_string()
}

fn default_session_cookie() -> String {
    "USER_CENTER_SESSION".to_string()
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_session_sweep_interval() -> u64 {
    60
}

impl AppConfig {
    /// Load from `USER_CENTER_CONFIG` if set, otherwise from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = match std::env::var("USER_CENTER_CONFIG") {
            Ok(path) => {
                let config = Self::from_file(&path)?;
                tracing::info!(path = %path, "Loaded configuration from file");
                config
            }
            Err(_) => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self.session_ttl_secs == 0 {
            return Err(AppError::Config("session_ttl_secs must be positive".to_string()));
        }
        if self.session_sweep_interval == 0 {
            return Err(AppError::Config(
                "session_sweep_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables prefixed with `USER_CENTER_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("USER_CENTER_").from_env::<AppConfig>()
    }

    /// Load configuration from a file (TOML, JSON or YAML by extension).
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match extension {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };

        Ok(config)
    }

    /// Server bind address suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: default_storage(),
            cors_allowed_origins: default_cors_allowed_origins(),
            password_salt: default_password_salt(),
            session_cookie: default_session_cookie(),
            session_ttl_secs: default_session_ttl_secs(),
            session_sweep_interval: default_session_sweep_interval(),
        }
    }
}
