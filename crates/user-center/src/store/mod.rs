//! Persistence seam for user records.
//!
//! The account service only talks to [`UserStore`]; the server picks a
//! backend at startup.

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewUser, Page, PageRequest, QueryFilter, User};

/// Storage operations the account service needs.
///
/// Only non-deleted users are visible through any of these.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Number of users with exactly this account.
    async fn count_by_account(&self, account: &str) -> AppResult<i64>;

    /// The user whose account and password digest both match exactly.
    async fn find_by_account_and_password(
        &self,
        account: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>>;

    /// Persist a new user and return its id.
    ///
    /// Fails with `AccountAlreadyExists` when the account is taken.
    async fn insert(&self, user: NewUser) -> AppResult<i64>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// One page of users matching `filter`, in the filter's order.
    async fn list(&self, filter: &QueryFilter, page: PageRequest) -> AppResult<Page<User>>;
}
