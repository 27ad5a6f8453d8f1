//! Application error types

use thiserror::Error;
use warden_domain::{AuthError, ErrorCode};

use crate::ports::{ProviderError, StoreError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// An expected authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The identity provider could not be reached or refused the exchange.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A store call did not answer in time.
    #[error("operation timed out: {0}")]
    Timeout(&'static str),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Returns true for the caller-recoverable authentication taxonomy.
    ///
    /// Everything else is an unexpected failure.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Public error code. Unexpected failures collapse to [`ErrorCode::INTERNAL`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(e) => e.code(),
            _ => ErrorCode::INTERNAL,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_internal() {
        let err = ApplicationError::from(StoreError::Unavailable("redis down".into()));
        assert!(!err.is_expected());
        assert_eq!(err.code(), ErrorCode::INTERNAL);
    }

    #[test]
    fn test_auth_failures_keep_their_code() {
        let err = ApplicationError::from(AuthError::ExpiredCredential);
        assert!(err.is_expected());
        assert_eq!(err.code(), ErrorCode::EXPIRED_TOKEN);
        assert_eq!(err.to_string(), "credential expired");
    }

    #[test]
    fn test_timeout_is_unexpected() {
        let err = ApplicationError::Timeout("session_store.get");
        assert!(!err.is_expected());
        assert_eq!(err.code().status, 500);
    }
}
