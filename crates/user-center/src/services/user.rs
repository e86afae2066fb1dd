//! Account service: registration, login, session-bound current user,
//! logout, response views and admin listing.

use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    is_blank, LoginUserView, NewUser, Page, PageRequest, PublicUserView, QueryFilter, User,
    UserQueryRequest, UserRole, DEFAULT_USER_NAME,
};
use crate::session::{SessionStore, USER_LOGIN_STATE};
use crate::store::UserStore;

/// Shortest password accepted at registration and login.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest password accepted at login.
pub const MAX_LOGIN_PASSWORD_LEN: usize = 18;

/// Accounts at least this long never log in.
pub const MAX_ACCOUNT_LEN: usize = 256;

/// Service for account operations.
#[derive(Clone)]
pub struct UserAccountService {
    store: Arc<dyn UserStore>,
    password_salt: String,
}

impl UserAccountService {
    /// Create a new account service.
    ///
    /// # Arguments
    ///
    /// * `store` - Backing user store
    /// * `password_salt` - Fixed salt prepended to passwords before hashing.
    ///   It must match the salt the stored digests were made with.
    pub fn new(store: Arc<dyn UserStore>, password_salt: impl Into<String>) -> Self {
        Self {
            store,
            password_salt: password_salt.into(),
        }
    }

    /// Register a new account and return its id.
    pub async fn register(
        &self,
        account: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<i64> {
        if is_blank(account) || is_blank(password) || is_blank(confirm_password) {
            return Err(AppError::InvalidArgument(
                "Parameters must not be blank".to_string(),
            ));
        }
        if char_len(password) < MIN_PASSWORD_LEN || char_len(confirm_password) < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidArgument("Password is too short".to_string()));
        }
        if password != confirm_password {
            return Err(AppError::InvalidArgument(
                "The two passwords do not match".to_string(),
            ));
        }

        if self.store.count_by_account(account).await? > 0 {
            return Err(AppError::AccountAlreadyExists);
        }

        let new_user = NewUser {
            user_account: account.to_string(),
            user_password: self.hashed_password(password),
            user_name: DEFAULT_USER_NAME.to_string(),
            user_role: UserRole::User,
        };
        let id = self.store.insert(new_user).await.map_err(|e| match e {
            AppError::AccountAlreadyExists => e,
            other => {
                tracing::error!(error = %other, account = %account, "Failed to persist new user");
                AppError::System("Registration failed".to_string())
            }
        })?;

        tracing::info!(user_id = id, account = %account, "User registered");
        Ok(id)
    }

    /// Check credentials and bind the user to `session`.
    ///
    /// Over-long accounts and out-of-range passwords are reported exactly
    /// like a wrong password.
    pub async fn login<S>(
        &self,
        account: &str,
        password: &str,
        session: &mut S,
    ) -> AppResult<LoginUserView>
    where
        S: SessionStore + ?Sized,
    {
        if is_blank(account) || is_blank(password) {
            return Err(AppError::InvalidArgument(
                "Parameters must not be blank".to_string(),
            ));
        }
        if char_len(account) >= MAX_ACCOUNT_LEN {
            return Err(AppError::InvalidCredentials);
        }
        let password_len = char_len(password);
        if !(MIN_PASSWORD_LEN..=MAX_LOGIN_PASSWORD_LEN).contains(&password_len) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = self.hashed_password(password);
        let user = self
            .store
            .find_by_account_and_password(account, &password_hash)
            .await?
            .ok_or_else(|| {
                tracing::info!(account = %account, "Login failed, account and password do not match");
                AppError::InvalidCredentials
            })?;

        let stored = serde_json::to_value(&user)
            .map_err(|e| AppError::System(format!("serializing session user: {}", e)))?;
        session.set(USER_LOGIN_STATE, stored);

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginUserView::from(&user))
    }

    /// The session's user, freshly loaded from the store.
    ///
    /// A session pointing at a user that no longer exists counts as not
    /// logged in.
    pub async fn current_user<S>(&self, session: &S) -> AppResult<User>
    where
        S: SessionStore + ?Sized,
    {
        let user_id = session
            .get(USER_LOGIN_STATE)
            .and_then(|stored| stored.get("id"))
            .and_then(Value::as_i64)
            .ok_or(AppError::NotAuthenticated)?;

        self.store.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::debug!(user_id, "Session user no longer exists");
            AppError::NotAuthenticated
        })
    }

    /// Remove the user from `session`.
    pub fn logout<S>(&self, session: &mut S) -> AppResult<bool>
    where
        S: SessionStore + ?Sized,
    {
        if session.remove(USER_LOGIN_STATE).is_none() {
            return Err(AppError::NotAuthenticated);
        }
        tracing::info!("User logged out");
        Ok(true)
    }

    pub fn to_login_view(user: Option<&User>) -> Option<LoginUserView> {
        user.map(LoginUserView::from)
    }

    pub fn to_public_view(user: Option<&User>) -> Option<PublicUserView> {
        user.map(PublicUserView::from)
    }

    pub fn to_public_view_list(users: &[User]) -> Vec<PublicUserView> {
        users.iter().map(PublicUserView::from).collect()
    }

    /// Build the listing filter for an admin query.
    pub fn build_query_filter(request: Option<&UserQueryRequest>) -> AppResult<QueryFilter> {
        let request = request
            .ok_or_else(|| AppError::InvalidArgument("Request parameters are empty".to_string()))?;
        QueryFilter::from_request(request)
    }

    /// One page of sanitized users for the admin listing.
    pub async fn list_users(
        &self,
        request: Option<&UserQueryRequest>,
    ) -> AppResult<Page<PublicUserView>> {
        let request = request
            .ok_or_else(|| AppError::InvalidArgument("Request parameters are empty".to_string()))?;
        let filter = Self::build_query_filter(Some(request))?;
        let page = PageRequest::new(request.current, request.page_size)?;

        let users = self.store.list(&filter, page).await?;
        Ok(users.map(|user| PublicUserView::from(user)))
    }

    /// Fail with `Forbidden` unless `user` is an admin.
    pub fn require_admin(user: &User) -> AppResult<()> {
        if user.user_role == UserRole::Admin {
            Ok(())
        } else {
            tracing::info!(user_id = user.id, role = %user.user_role, "Admin access denied");
            Err(AppError::Forbidden("No permission".to_string()))
        }
    }

    /// Legacy password digest: lowercase hex MD5 of salt followed by password.
    ///
    /// Stored passwords are compared against this exact output.
    pub fn hashed_password(&self, password: &str) -> String {
        let salted = format!("{}{}", self.password_salt, password);
        format!("{:x}", md5::compute(salted.as_bytes()))
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::store::MemoryUserStore;
    use async_trait::async_trait;

    const SALT: &str = "lilac";

    fn service() -> (UserAccountService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        (UserAccountService::new(store.clone(), SALT), store)
    }

    async fn registered(service: &UserAccountService, account: &str) -> i64 {
        service.register(account, "secret1", "secret1").await.unwrap()
    }

    #[test]
    fn test_hashed_password_is_stable() {
        let (service, _) = service();
        assert_eq!(service.hashed_password("secret"), "eb1e9f3afc0ce5c73158b74e65872ee5");
        assert_eq!(service.hashed_password("secret"), service.hashed_password("secret"));
        assert_eq!(service.hashed_password("123456"), "dbc21ae0b14577875ea8b93bd16b0f92");
    }

    #[tokio::test]
    async fn test_register_blank_fields() {
        let (service, _) = service();
        for (account, password, confirm) in [
            ("", "secret1", "secret1"),
            ("alice", "  ", "secret1"),
            ("alice", "secret1", ""),
        ] {
            let result = service.register(account, password, confirm).await;
            assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        }
    }

    #[tokio::test]
    async fn test_register_password_length_boundary() {
        let (service, _) = service();
        assert!(matches!(
            service.register("alice", "12345", "12345").await,
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(service.register("alice", "123456", "123456").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_mismatched_passwords() {
        let (service, _) = service();
        assert!(matches!(
            service.register("alice", "secret1", "secret2").await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.register("alice", "secret1", "short").await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_account() {
        let (service, _) = service();
        registered(&service, "alice").await;
        assert!(matches!(
            service.register("alice", "another1", "another1").await,
            Err(AppError::AccountAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_register_stores_defaults_and_digest() {
        let (service, store) = service();
        let id = registered(&service, "alice").await;

        let user = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.user_name, "user");
        assert_eq!(user.user_role, UserRole::User);
        assert_eq!(user.user_password, service.hashed_password("secret1"));
    }

    struct FailingInsertStore;

    #[async_trait]
    impl UserStore for FailingInsertStore {
        async fn count_by_account(&self, _account: &str) -> AppResult<i64> {
            Ok(0)
        }

        async fn find_by_account_and_password(
            &self,
            _account: &str,
            _password_hash: &str,
        ) -> AppResult<Option<User>> {
            Ok(None)
        }

        async fn insert(&self, _user: NewUser) -> AppResult<i64> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_id(&self, _id: i64) -> AppResult<Option<User>> {
            Ok(None)
        }

        async fn list(&self, _filter: &QueryFilter, page: PageRequest) -> AppResult<Page<User>> {
            Ok(Page {
                records: Vec::new(),
                total: 0,
                current: page.current,
                size: page.page_size,
            })
        }
    }

    #[tokio::test]
    async fn test_register_persistence_failure_is_system_error() {
        let service = UserAccountService::new(Arc::new(FailingInsertStore), SALT);
        assert!(matches!(
            service.register("alice", "secret1", "secret1").await,
            Err(AppError::System(_))
        ));
    }

    #[tokio::test]
    async fn test_login_success_binds_session() {
        let (service, _) = service();
        let id = registered(&service, "alice").await;

        let mut session = Session::new();
        let view = service.login("alice", "secret1", &mut session).await.unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.user_account, "alice");
        assert!(serde_json::to_value(&view).unwrap().get("userPassword").is_none());
        assert!(session.get(USER_LOGIN_STATE).is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _) = service();
        registered(&service, "alice").await;

        let mut session = Session::new();
        assert!(matches!(
            service.login("alice", "secret2", &mut session).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_login_blank_is_invalid_argument() {
        let (service, _) = service();
        let mut session = Session::new();
        assert!(matches!(
            service.login(" ", "secret1", &mut session).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_login_masks_long_account() {
        let (service, _) = service();
        let account = "a".repeat(MAX_ACCOUNT_LEN);
        registered(&service, &account).await;

        let mut session = Session::new();
        assert!(matches!(
            service.login(&account, "secret1", &mut session).await,
            Err(AppError::InvalidCredentials)
        ));

        let shorter = "b".repeat(MAX_ACCOUNT_LEN - 1);
        registered(&service, &shorter).await;
        assert!(service.login(&shorter, "secret1", &mut session).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_password_length_bounds() {
        let (service, _) = service();
        service
            .register("alice", "a_long_password_19c", "a_long_password_19c")
            .await
            .unwrap();

        let mut session = Session::new();
        // Registered fine, but 19 characters is outside the login window
        assert!(matches!(
            service.login("alice", "a_long_password_19c", &mut session).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("alice", "12345", &mut session).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_current_user_and_logout() {
        let (service, _) = service();
        let id = registered(&service, "alice").await;
        let mut session = Session::new();

        assert!(matches!(
            service.current_user(&session).await,
            Err(AppError::NotAuthenticated)
        ));

        service.login("alice", "secret1", &mut session).await.unwrap();
        assert_eq!(service.current_user(&session).await.unwrap().id, id);

        assert!(service.logout(&mut session).unwrap());
        assert!(matches!(
            service.current_user(&session).await,
            Err(AppError::NotAuthenticated)
        ));
        assert!(matches!(
            service.logout(&mut session),
            Err(AppError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_current_user_reflects_store_changes() {
        let (service, store) = service();
        let id = registered(&service, "alice").await;
        let mut session = Session::new();
        service.login("alice", "secret1", &mut session).await.unwrap();

        store
            .update(id, |user| user.user_profile = Some("updated".to_string()))
            .await;
        let user = service.current_user(&session).await.unwrap();
        assert_eq!(user.user_profile.as_deref(), Some("updated"));
    }

    #[tokio::test]
    async fn test_current_user_deleted_is_not_authenticated() {
        let (service, store) = service();
        let id = registered(&service, "alice").await;
        let mut session = Session::new();
        service.login("alice", "secret1", &mut session).await.unwrap();

        store.mark_deleted(id).await;
        assert!(matches!(
            service.current_user(&session).await,
            Err(AppError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_session_value_without_id() {
        let (service, _) = service();
        let mut session = Session::new();
        session.set(USER_LOGIN_STATE, serde_json::json!({"userAccount": "alice"}));
        assert!(matches!(
            service.current_user(&session).await,
            Err(AppError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_views_of_none() {
        assert!(UserAccountService::to_login_view(None).is_none());
        assert!(UserAccountService::to_public_view(None).is_none());
        assert!(UserAccountService::to_public_view_list(&[]).is_empty());
    }

    #[test]
    fn test_build_query_filter_requires_request() {
        assert!(matches!(
            UserAccountService::build_query_filter(None),
            Err(AppError::InvalidArgument(_))
        ));

        let request = UserQueryRequest {
            user_role: Some("admin".to_string()),
            ..Default::default()
        };
        let filter = UserAccountService::build_query_filter(Some(&request)).unwrap();
        assert_eq!(filter.user_role.as_deref(), Some("admin"));
        assert!(filter.id.is_none() && filter.user_account.is_none() && filter.sort.is_none());
    }

    #[tokio::test]
    async fn test_list_users_pages_public_views() {
        let (service, _) = service();
        for account in ["alice", "alina", "bob"] {
            registered(&service, account).await;
        }

        let request = UserQueryRequest {
            user_account: Some("ali".to_string()),
            sort_field: Some("id".to_string()),
            sort_order: Some("ascend".to_string()),
            page_size: 1,
            ..Default::default()
        };
        let page = service.list_users(Some(&request)).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].user_account, "alice");

        let too_big = UserQueryRequest {
            page_size: 500,
            ..Default::default()
        };
        assert!(matches!(
            service.list_users(Some(&too_big)).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_list_users_huge_page_number() {
        let (service, _) = service();
        registered(&service, "alice").await;

        let request = UserQueryRequest {
            current: i64::MAX,
            page_size: 10,
            ..Default::default()
        };
        assert!(matches!(
            service.list_users(Some(&request)).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_require_admin() {
        let mut user = crate::models::user::sample_user(1, "alice");
        assert!(matches!(
            UserAccountService::require_admin(&user),
            Err(AppError::Forbidden(_))
        ));
        user.user_role = UserRole::Admin;
        assert!(UserAccountService::require_admin(&user).is_ok());
    }
}
