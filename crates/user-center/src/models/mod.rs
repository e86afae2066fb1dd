//! Domain models for the User Center.

pub mod query;
pub mod user;

pub use query::*;
pub use user::*;

/// Empty or whitespace-only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
