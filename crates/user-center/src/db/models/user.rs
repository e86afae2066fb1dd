//! Row model for the `users` table.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::User;

/// A row of `users`.
///
/// `user_role` stays a string here; it is checked when converting to
/// [`User`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub user_account: String,
    pub user_password: String,
    pub user_name: String,
    #[sqlx(default)]
    pub user_profile: Option<String>,
    pub user_role: String,
    pub edit_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub is_delete: bool,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_role = row
            .user_role
            .parse()
            .map_err(|e: String| AppError::System(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: row.id,
            user_account: row.user_account,
            user_password: row.user_password,
            user_name: row.user_name,
            user_profile: row.user_profile,
            user_role,
            edit_time: row.edit_time,
            create_time: row.create_time,
            update_time: row.update_time,
            is_delete: row.is_delete,
        })
    }
}
