//! Application state for the User Center server.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::UserAccountService;
use crate::session::SessionRegistry;
use crate::store::UserStore;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Account service
    pub users: UserAccountService,

    /// Server-side sessions keyed by cookie
    pub sessions: SessionRegistry,

    /// Database pool, absent with the memory backend
    pub db: Option<DbPool>,

    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, db: Option<DbPool>, config: AppConfig) -> Self {
        Self {
            users: UserAccountService::new(store, config.password_salt.clone()),
            sessions: SessionRegistry::new(Duration::from_secs(config.session_ttl_secs)),
            db,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the server uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
