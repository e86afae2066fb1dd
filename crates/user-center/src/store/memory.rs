//! Process-local user store.
//!
//! Used for development runs (`USER_CENTER_STORAGE=memory`) and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, Page, PageRequest, QueryFilter, User};

#[derive(Debug)]
struct MemoryState {
    next_id: i64,
    users: Vec<User>,
}

/// User store backed by a vector behind a lock.
#[derive(Debug)]
pub struct MemoryUserStore {
    state: RwLock<MemoryState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                users: Vec::new(),
            }),
        }
    }

    /// Soft-delete a user. Returns false if no live user has this id.
    pub async fn mark_deleted(&self, id: i64) -> bool {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.id == id && !u.is_delete) {
            Some(user) => {
                user.is_delete = true;
                user.update_time = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Apply `f` to a live user, as an admin edit would.
    pub async fn update<F: FnOnce(&mut User)>(&self, id: i64, f: F) -> bool {
        let mut state = self.state.write().await;
        match state.users.iter_mut().find(|u| u.id == id && !u.is_delete) {
            Some(user) => {
                f(user);
                user.update_time = Utc::now();
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn count_by_account(&self, account: &str) -> AppResult<i64> {
        let state = self.state.read().await;
        let count = state
            .users
            .iter()
            .filter(|u| !u.is_delete && u.user_account == account)
            .count();
        Ok(count as i64)
    }

    async fn find_by_account_and_password(
        &self,
        account: &str,
        password_hash: &str,
    ) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| !u.is_delete && u.user_account == account && u.user_password == password_hash)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> AppResult<i64> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| !u.is_delete && u.user_account == user.user_account)
        {
            return Err(AppError::AccountAlreadyExists);
        }

        let id = state.next_id;
        state.next_id += 1;
        let now = Utc::now();
        state.users.push(User {
            id,
            user_account: user.user_account,
            user_password: user.user_password,
            user_name: user.user_name,
            user_profile: None,
            user_role: user.user_role,
            edit_time: now,
            create_time: now,
            update_time: now,
            is_delete: false,
        });
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| !u.is_delete && u.id == id)
            .cloned())
    }

    async fn list(&self, filter: &QueryFilter, page: PageRequest) -> AppResult<Page<User>> {
        let state = self.state.read().await;
        let mut matching: Vec<&User> = state
            .users
            .iter()
            .filter(|u| !u.is_delete && filter.matches(u))
            .collect();
        matching.sort_by(|a, b| filter.compare(a, b));

        let total = matching.len() as i64;
        let records = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();

        Ok(Page {
            records,
            total,
            current: page.current,
            size: page.page_size,
        })
    }
}
