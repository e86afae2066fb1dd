//! User entity and the sanitized views handed out in API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default display name given to freshly registered users.
pub const DEFAULT_USER_NAME: &str = "user";

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Ban,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Ban => "ban",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            "ban" => Ok(UserRole::Ban),
            other => Err(format!("unknown user role '{}'", other)),
        }
    }
}

/// Persisted user.
///
/// `user_password` holds the salted digest, never the plain password.
/// This is the shape kept in the session, so it is serializable, but it is
/// never written to a response directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub user_account: String,
    pub user_password: String,
    pub user_name: String,
    pub user_profile: Option<String>,
    pub user_role: UserRole,
    pub edit_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub is_delete: bool,
}

/// Values for a user that has not been stored yet. The store assigns the
/// id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub user_account: String,
    pub user_password: String,
    pub user_name: String,
    pub user_role: UserRole,
}

/// What the logged-in user sees about themself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserView {
    pub id: i64,
    pub user_account: String,
    pub user_name: String,
    pub user_profile: Option<String>,
    pub user_role: UserRole,
    pub edit_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl From<&User> for LoginUserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_account: user.user_account.clone(),
            user_name: user.user_name.clone(),
            user_profile: user.user_profile.clone(),
            user_role: user.user_role,
            edit_time: user.edit_time,
            create_time: user.create_time,
            update_time: user.update_time,
        }
    }
}

/// What other users and admins see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserView {
    pub id: i64,
    pub user_account: String,
    pub user_name: String,
    pub user_profile: Option<String>,
    pub user_role: UserRole,
    pub create_time: DateTime<Utc>,
}

impl From<&User> for PublicUserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_account: user.user_account.clone(),
            user_name: user.user_name.clone(),
            user_profile: user.user_profile.clone(),
            user_role: user.user_role,
            create_time: user.create_time,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_user(id: i64, account: &str) -> User {
    let now = Utc::now();
    User {
        id,
        user_account: account.to_string(),
        user_password: "eb1e9f3afc0ce5c73158b74e65872ee5".to_string(),
        user_name: DEFAULT_USER_NAME.to_string(),
        user_profile: Some("hello".to_string()),
        user_role: UserRole::User,
        edit_time: now,
        create_time: now,
        update_time: now,
        is_delete: false,
    }
}
