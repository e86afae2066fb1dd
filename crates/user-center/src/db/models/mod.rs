//! Database row models.

pub mod user;

pub use user::*;
