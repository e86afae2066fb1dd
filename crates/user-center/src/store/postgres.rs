//! PostgreSQL-backed user store.

use async_trait::async_trait;

use super::UserStore;
use crate::db::queries::user as queries;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{NewUser, Page, PageRequest, QueryFilter, User};

/// User store over the `users` table in the configured schema.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count_by_account(&self, account: &str) -> AppResult<i64> {
        queries::count_by_account(&self.pool, account).await
    }

    async fn find_by_account_and_password(
        &self,
        account: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        queries::find_by_account_and_password(&self.pool, account, password_hash)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert(&self, user: NewUser) -> AppResult<i64> {
        queries::insert_user(&self.pool, &user).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        queries::find_by_id(&self.pool, id)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list(&self, filter: &QueryFilter, page: PageRequest) -> AppResult<Page<User>> {
        let (rows, total) = queries::list_users(&self.pool, filter, page).await?;
        let records = rows
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            records,
            total,
            current: page.current,
            size: page.page_size,
        })
    }
}
