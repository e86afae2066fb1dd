//! HTTP handlers for the User Center API.
//!
//! This module contains the route handlers, the response envelope and the
//! session/admin middleware.

pub mod health;
pub mod middleware;
pub mod response;
pub mod user;

pub use health::{api_health, health_check};
