//! Canonical local identities.
//!
//! An identity is one social account binding, keyed by `(email, provider)`.
//! The same e-mail signed in through two providers yields two identities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Supported third-party identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Google `OpenID` Connect.
    Google,
    /// Kakao Login.
    Kakao,
}

impl Provider {
    /// All supported providers.
    pub const ALL: [Self; 2] = [Self::Google, Self::Kakao];

    /// The registration tag used in URLs, claims and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Kakao => "kakao",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "kakao" => Ok(Self::Kakao),
            _ => Err(AuthError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Composite identity key: one account per `(email, provider)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId {
    /// E-mail reported by the provider.
    pub email: String,
    /// Provider the account belongs to.
    pub provider: Provider,
}

impl UserId {
    /// Creates a new identity key.
    pub fn new(email: impl Into<String>, provider: Provider) -> Self {
        Self {
            email: email.into(),
            provider,
        }
    }

    /// Stable string form used to build store keys (`google:a@x.com`).
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.provider, self.email)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.email, self.provider)
    }
}

/// Local user record owned by the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity key.
    pub id: UserId,
    /// Provider-side account identifier (`sub` for Google, `id` for Kakao).
    pub provider_user_id: String,
    /// Display name, if the provider supplied one.
    pub display_name: Option<String>,
    /// Verified national identifier ("CI"), only when the provider supplies it.
    pub verified_identifier: Option<String>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// Last successful provider login.
    pub last_login_at: DateTime<Utc>,
}

impl User {
    /// Creates a record for a first-time login.
    #[must_use]
    pub fn new(
        id: UserId,
        provider_user_id: impl Into<String>,
        display_name: Option<String>,
        verified_identifier: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            provider_user_id: provider_user_id.into(),
            display_name,
            verified_identifier,
            created_at: now,
            last_login_at: now,
        }
    }

    /// Applies the mutable fields of a repeat login.
    ///
    /// Fields the provider did not send this time keep their stored value.
    pub fn record_login(
        &mut self,
        display_name: Option<String>,
        verified_identifier: Option<String>,
        now: DateTime<Utc>,
    ) {
        if display_name.is_some() {
            self.display_name = display_name;
        }
        if verified_identifier.is_some() {
            self.verified_identifier = verified_identifier;
        }
        self.last_login_at = now;
    }
}
