//! Credential claims and token pairs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Provider, UserId};

/// Which of the two credential kinds a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential presented on each API call.
    Access,
    /// Long-lived credential exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    /// Lowercase tag used in the `typ` claim.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON claims carried inside a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject e-mail.
    pub sub: String,
    /// Provider the subject signed in with.
    pub provider: Provider,
    /// Credential kind.
    pub typ: TokenKind,
    /// Unique credential id.
    pub jti: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// The identity the credential was issued for.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone(), self.provider)
    }

    /// Returns true once `now` has reached `exp`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// A freshly issued access + refresh pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Access credential.
    pub access_token: String,
    /// Refresh credential.
    pub refresh_token: String,
    /// Refresh credential lifetime in seconds, for the cookie `Max-Age`.
    pub refresh_max_age_secs: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("refresh_max_age_secs", &self.refresh_max_age_secs)
            .finish()
    }
}
