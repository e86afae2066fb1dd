//! Database module for the User Center server.
//!
//! PostgreSQL connectivity, schema bootstrap, row models and queries,
//! using SQLx.

pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;

pub use pool::{create_pool, DbPool};
