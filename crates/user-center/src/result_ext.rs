//! Result extension trait for logging errors with context.

use std::fmt::Display;
use tracing::error;

/// Extension trait for logging errors with context.
///
/// Adds a `log` method to `Result` that records the error, the context
/// message and the caller's source location, then hands the result back.
pub trait ResultExt<T, E> {
    /// Log the error with context if this is an `Err` variant.
    ///
    /// ```ignore
    /// use user_center::result_ext::ResultExt;
    ///
    /// let listener = TcpListener::bind(addr).await.log("binding listener")?;
    /// ```
    fn log<S: ToString>(self, context: S) -> Result<T, E>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller_location = std::panic::Location::caller();
            error!(
                target: "user_center",
                error = %e,
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Operation failed"
            );
        }
        self
    }
}

/// Extension trait for logging a missing value, returning the Option.
pub trait OptionResultExt<T> {
    /// Log if this is a `None` variant.
    fn log_none<S: ToString>(self, context: S) -> Option<T>;
}

impl<T> OptionResultExt<T> for Option<T> {
    #[track_caller]
    fn log_none<S: ToString>(self, context: S) -> Option<T> {
        if self.is_none() {
            let caller_location = std::panic::Location::caller();
            tracing::warn!(
                target: "user_center",
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Expected value was None"
            );
        }
        self
    }
}
