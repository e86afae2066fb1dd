//! User Center Library
//!
//! This crate provides the account service behind the User Center API:
//!
//! - **Registration**: validate credentials and persist new accounts
//! - **Login / Logout**: password login bound to a server-side session
//! - **Current User**: resolve the session's user against the store
//! - **Admin Listing**: filtered, paginated user listing for administrators
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables or a file
//! - [`db`]: PostgreSQL connectivity, schema and queries
//! - [`error`]: Custom error types with Axum integration
//! - [`handlers`]: HTTP route handlers and middleware
//! - [`models`]: User entity, response views and query filters
//! - [`services`]: The account service
//! - [`session`]: Session attribute storage and the session registry
//! - [`store`]: The `UserStore` persistence seam and its backends
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use user_center::{config::AppConfig, router::build_router, state::AppState, store::MemoryUserStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let state = AppState::new(Arc::new(MemoryUserStore::new()), None, config);
//!     let app = build_router(state);
//!     // ... bind and serve
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod result_ext;
pub mod router;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use error::{AppError, AppResult};
pub use result_ext::ResultExt;
