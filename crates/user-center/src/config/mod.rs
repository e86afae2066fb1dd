//! Configuration module for the User Center server.
//!
//! Settings come from environment variables parsed with `envy`, or from a
//! config file for the application settings.

mod app;
mod database;

pub use app::{AppConfig, StorageBackend};
pub use database::DatabaseConfig;
