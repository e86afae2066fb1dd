//! Uniform response envelope.

use serde::{Deserialize, Serialize};

use crate::error::codes;

/// `{"code": ..., "data": ..., "msg": ...}` wrapper around every API result.
///
/// `code` is [`codes::SUCCESS`] on success, otherwise the error's business
/// code with `data` set to null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    pub msg: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: codes::SUCCESS,
            data: Some(data),
            msg: "ok".to_string(),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            msg: msg.into(),
        }
    }
}
