//! Error taxonomy for assistant operations.
//!
//! The scripted assistant never fails on its own; these variants exist so a
//! backend-driven implementation can surface transport and parse failures to
//! callers as typed values instead of retrying forever. Callers are expected
//! to treat every variant as recoverable (e.g. fall back to an empty
//! recommendation list and offer a retry).

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`AssistantError`].
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors surfaced by assistant and backend operations.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No catalog items to recommend or prescribe from.
    #[error("catalog is empty")]
    EmptyCatalog,

    /// Model output could not be parsed into the expected shape.
    #[error("invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// A call did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend asked us to slow down.
    #[error("rate limited by backend")]
    RateLimited {
        /// Backend-suggested wait before the next attempt.
        retry_after: Option<Duration>,
    },

    /// Caller supplied input the operation cannot accept.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller cancelled the in-flight call.
    #[error("request cancelled")]
    Cancelled,

    /// Backend-specific failure that is not worth retrying.
    #[error("backend error: {0}")]
    Backend(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AssistantError {
    /// Whether a retry policy should attempt the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssistantError::RateLimited { .. } | AssistantError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_variants() {
        assert!(AssistantError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(AssistantError::RateLimited { retry_after: None }.is_retryable());
        assert!(!AssistantError::EmptyCatalog.is_retryable());
        assert!(!AssistantError::InvalidResponseFormat("x".into()).is_retryable());
        assert!(!AssistantError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(AssistantError::EmptyCatalog.to_string(), "catalog is empty");
        assert_eq!(
            AssistantError::InvalidRequest("empty message".into()).to_string(),
            "invalid request: empty message"
        );
    }
}
