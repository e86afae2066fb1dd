//! Service layer for the User Center.
//!
//! Services hold the business rules and coordinate between handlers,
//! the session and the user store.

pub mod user;

pub use user::UserAccountService;
