//! User Center Server
//!
//! Account registration, login and session-bound user lookup over HTTP,
//! backed by PostgreSQL or an in-process store.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_center::{
    config::{AppConfig, DatabaseConfig, StorageBackend},
    db::{create_pool, schema::ensure_schema, DbPool},
    router::build_router,
    state::AppState,
    store::{MemoryUserStore, PgUserStore, UserStore},
    ResultExt,
};

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,user_center=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open the configured user store.
async fn build_store(config: &AppConfig) -> anyhow::Result<(Arc<dyn UserStore>, Option<DbPool>)> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory user store, accounts are lost on restart");
            Ok((Arc::new(MemoryUserStore::new()), None))
        }
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load database config, using defaults");
                DatabaseConfig::default()
            });

            let schema = db_config.schema_name().log("checking schema name")?;
            let pool = create_pool(&db_config).await.log("connecting to database")?;
            ensure_schema(&pool, schema).await.log("preparing schema")?;

            Ok((Arc::new(PgUserStore::new(pool.clone())), Some(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting User Center"
    );

    let config = AppConfig::load().log("loading configuration")?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        storage = ?config.storage,
        "Configuration loaded"
    );

    let (store, pool) = build_store(&config).await?;
    let sweep_interval = Duration::from_secs(config.session_sweep_interval);
    let addr: SocketAddr = config.bind_address().parse()?;

    let state = AppState::new(store, pool, config);
    let sweeper = state.sessions.spawn_sweeper(sweep_interval);

    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.log("binding listener")?;

    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
