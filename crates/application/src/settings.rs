//! Engine settings.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Operations that can carry a rate-limit budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitedOperation {
    /// Provider login completion.
    Login,
    /// Refresh rotation.
    Reissue,
    /// Logout.
    Logout,
}

impl LimitedOperation {
    /// Key prefix of the operation's rate windows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Reissue => "reissue",
            Self::Logout => "logout",
        }
    }
}

/// Fixed-window budget: `limit` calls per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitPolicy {
    /// Calls allowed inside one window.
    pub limit: u64,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimitPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(limit: u64, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Per-operation rate limits. `None` disables limiting for that operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Login completion budget.
    pub login: Option<RateLimitPolicy>,
    /// Reissue budget.
    pub reissue: Option<RateLimitPolicy>,
    /// Logout budget.
    pub logout: Option<RateLimitPolicy>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            login: None,
            reissue: Some(RateLimitPolicy::new(5, 60)),
            logout: None,
        }
    }
}

impl RateLimitSettings {
    /// Policy configured for `operation`.
    #[must_use]
    pub const fn policy(&self, operation: LimitedOperation) -> Option<RateLimitPolicy> {
        match operation {
            LimitedOperation::Login => self.login,
            LimitedOperation::Reissue => self.reissue,
            LimitedOperation::Logout => self.logout,
        }
    }
}

const fn default_access_ttl_secs() -> u64 {
    30 * 60
}

const fn default_refresh_ttl_secs() -> u64 {
    14 * 24 * 60 * 60
}

const fn default_store_timeout_ms() -> u64 {
    2_000
}

/// Settings of the authentication engine.
#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// Symmetric signing secret. Must be configured; never generated.
    pub signing_secret: String,
    /// Access credential lifetime in seconds.
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    /// Refresh credential lifetime in seconds.
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
    /// Upper bound for a single store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    /// Per-operation rate limits.
    #[serde(default)]
    pub rate_limits: RateLimitSettings,
}

impl AuthSettings {
    /// Settings with default lifetimes for the given secret.
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            store_timeout_ms: default_store_timeout_ms(),
            rate_limits: RateLimitSettings::default(),
        }
    }

    /// Access credential lifetime.
    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    /// Refresh credential lifetime.
    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }

    /// Store call timeout.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("signing_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("rate_limits", &self.rate_limits)
            .finish()
    }
}
