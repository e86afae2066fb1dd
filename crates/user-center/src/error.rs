//! Error types for the User Center server.
//!
//! Every failure of an account operation is one of a small set of
//! categories. Each category maps to an HTTP status and a numeric business
//! code carried in the response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::handlers::response::ApiResponse;

/// Business codes carried in the `code` field of the response envelope.
pub mod codes {
    pub const SUCCESS: i32 = 200;
    pub const PARAMS_ERROR: i32 = 400000;
    pub const NEED_LOGIN: i32 = 400001;
    pub const USER_EXIST: i32 = 400002;
    pub const USER_OR_PASSWORD_ERROR: i32 = 400003;
    pub const NO_AUTH: i32 = 403000;
    pub const SYSTEM_ERROR: i32 = 500000;
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Registration for an account that is already taken
    #[error("Account already exists")]
    AccountAlreadyExists,

    /// Account/password mismatch, or login input outside accepted bounds
    #[error("Invalid account or password")]
    InvalidCredentials,

    /// No user in the session, or the session's user no longer exists
    #[error("Not logged in")]
    NotAuthenticated,

    /// Logged in, but lacking the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Persistence or other server-side failure
    #[error("System error: {0}")]
    System(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Business code reported in the response envelope.
    pub fn code(&self) -> i32 {
        match self {
            AppError::InvalidArgument(_) => codes::PARAMS_ERROR,
            AppError::AccountAlreadyExists => codes::USER_EXIST,
            AppError::InvalidCredentials => codes::USER_OR_PASSWORD_ERROR,
            AppError::NotAuthenticated => codes::NEED_LOGIN,
            AppError::Forbidden(_) => codes::NO_AUTH,
            AppError::System(_) | AppError::Database(_) | AppError::Config(_) => {
                codes::SYSTEM_ERROR
            }
        }
    }

    /// HTTP status for the response.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::AccountAlreadyExists => StatusCode::CONFLICT,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::System(_) | AppError::Database(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Server-side details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::System(_) | AppError::Database(_) | AppError::Config(_) => {
                "System error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::System(msg) => tracing::error!(error = %msg, "System error"),
            AppError::Config(msg) => tracing::error!(error = %msg, "Configuration error"),
            AppError::InvalidCredentials | AppError::NotAuthenticated => {
                tracing::debug!(error = %self, "Request rejected")
            }
            _ => tracing::info!(error = %self, "Request rejected"),
        }

        let body = Json(ApiResponse::<()>::error(self.code(), self.client_message()));
        (self.status(), body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::System(err.to_string())
    }
}

impl From<envy::Error> for AppError {
    fn from(err: envy::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
