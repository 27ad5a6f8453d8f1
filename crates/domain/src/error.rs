//! Domain error types

use thiserror::Error;

/// Expected, caller-recoverable authentication failures.
///
/// Each variant is a distinct kind for logging and testing. The externally
/// visible code comes from [`AuthError::code`], which deliberately folds
/// signature failures and revocation into the same answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The credential's signature does not match its content.
    #[error("invalid credential signature")]
    InvalidSignature,

    /// The credential is not a well-formed signed blob.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The credential's `exp` lies in the past.
    #[error("credential expired")]
    ExpiredCredential,

    /// Structurally valid, but not something this service accepts
    /// (foreign algorithm, wrong token kind).
    #[error("unsupported credential format: {0}")]
    UnsupportedCredentialFormat(String),

    /// No credential was supplied.
    #[error("credential is empty")]
    EmptyCredential,

    /// No active session exists for the identity.
    #[error("session not found")]
    SessionNotFound,

    /// The presented refresh value differs from the stored one.
    ///
    /// Usually means an already-rotated refresh credential was replayed.
    #[error("refresh credential does not match the active session")]
    RefreshValueMismatch,

    /// Too many attempts for the given rate-limit key.
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The caller is not authenticated (includes revoked credentials).
    #[error("unauthenticated")]
    Unauthenticated,

    /// The provider tag is not one of the supported providers.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The provider profile lacks a field the identity cannot exist without.
    #[error("provider profile is missing `{0}`")]
    IncompleteProfile(&'static str),
}

/// Stable public error code attached to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    /// HTTP status class for the error.
    pub status: u16,
    /// Short machine-readable code.
    pub code: &'static str,
    /// Human-readable message that reveals no internals.
    pub message: &'static str,
}

impl ErrorCode {
    /// Invalid credential.
    pub const INVALID_TOKEN: Self = Self::new(401, "A001", "Invalid token.");
    /// Expired credential.
    pub const EXPIRED_TOKEN: Self = Self::new(401, "A002", "Token has expired.");
    /// Missing or insufficient authentication.
    pub const UNAUTHORIZED: Self = Self::new(401, "A003", "Authentication is required.");
    /// Tampered or malformed credential.
    pub const MALFORMED_TOKEN: Self = Self::new(401, "A004", "Malformed token.");
    /// Empty credential.
    pub const EMPTY_TOKEN: Self = Self::new(401, "A005", "Token is empty.");
    /// Session gone.
    pub const SESSION_NOT_FOUND: Self =
        Self::new(401, "A006", "Session has expired. Please sign in again.");
    /// Provider not supported.
    pub const UNSUPPORTED_PROVIDER: Self =
        Self::new(400, "A007", "Unsupported identity provider.");
    /// Provider did not share required profile data.
    pub const INCOMPLETE_PROFILE: Self =
        Self::new(400, "A008", "The identity provider did not share the required profile data.");
    /// Anything unexpected.
    pub const INTERNAL: Self = Self::new(500, "C003", "An internal server error occurred.");
    /// Rate limited.
    pub const TOO_MANY_REQUESTS: Self =
        Self::new(429, "C007", "Too many requests. Please try again later.");

    const fn new(status: u16, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

impl AuthError {
    /// Maps the error to its public code.
    ///
    /// `InvalidSignature` and `Unauthenticated` share [`ErrorCode::UNAUTHORIZED`]
    /// so a revoked credential is indistinguishable from a forged one.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidSignature | Self::Unauthenticated => ErrorCode::UNAUTHORIZED,
            Self::MalformedCredential(_) => ErrorCode::MALFORMED_TOKEN,
            Self::ExpiredCredential => ErrorCode::EXPIRED_TOKEN,
            Self::UnsupportedCredentialFormat(_) | Self::RefreshValueMismatch => {
                ErrorCode::INVALID_TOKEN
            }
            Self::EmptyCredential => ErrorCode::EMPTY_TOKEN,
            Self::SessionNotFound => ErrorCode::SESSION_NOT_FOUND,
            Self::RateLimitExceeded(_) => ErrorCode::TOO_MANY_REQUESTS,
            Self::UnsupportedProvider(_) => ErrorCode::UNSUPPORTED_PROVIDER,
            Self::IncompleteProfile(_) => ErrorCode::INCOMPLETE_PROFILE,
        }
    }

    /// Returns true for failures that point at credential replay or tampering.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(self, Self::InvalidSignature | Self::RefreshValueMismatch)
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, AuthError>;
