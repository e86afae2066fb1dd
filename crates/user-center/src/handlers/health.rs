//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::db::pool::health_check as db_health_check;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Health status ("ok" or "unhealthy")
    pub status: String,
}

/// Detailed health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealthResponse {
    pub status: String,

    /// "connected", "disconnected", or "memory" for the in-process store
    pub storage: String,

    /// Live sessions, including ones not yet swept
    pub sessions: usize,

    pub uptime_seconds: u64,

    pub version: String,
}

/// Basic health check endpoint.
///
/// `GET /health`
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Detailed health check endpoint.
///
/// `GET /api/health`
///
/// - `200 OK` when storage is reachable
/// - `503 Service Unavailable` when the database is not
pub async fn api_health(State(state): State<AppState>) -> (StatusCode, Json<ApiHealthResponse>) {
    let (healthy, storage) = match &state.db {
        Some(pool) => {
            if db_health_check(pool).await {
                (true, "connected")
            } else {
                (false, "disconnected")
            }
        }
        None => (true, "memory"),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ApiHealthResponse {
        status: if healthy { "ok" } else { "unhealthy" }.to_string(),
        storage: storage.to_string(),
        sessions: state.sessions.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::MemoryUserStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn test_api_health_memory_backend() {
        let state = AppState::new(Arc::new(MemoryUserStore::new()), None, AppConfig::default());
        let (status, Json(body)) = api_health(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.storage, "memory");
        assert_eq!(body.sessions, 0);
    }
}
