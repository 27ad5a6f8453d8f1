//! Security audit events.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sensitive operations that are audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    /// Provider login completed and tokens issued.
    Login,
    /// Refresh credential rotated.
    TokenReissue,
    /// Session ended.
    Logout,
    /// Bearer credential checked by the request gate.
    AccessCheck,
    /// A rate-limit budget was exhausted.
    RateLimitExceeded,
}

impl AuditOperation {
    /// Event type tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::TokenReissue => "TOKEN_REISSUE",
            Self::Logout => "LOGOUT",
            Self::AccessCheck => "ACCESS_CHECK",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditLevel {
    /// Operation succeeded.
    Info,
    /// Expected, security-relevant failure.
    Warn,
    /// Unexpected failure.
    Error,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Operation type.
    #[serde(rename = "type")]
    pub operation: AuditOperation,
    /// Acting identity, or `unknown`.
    pub user: String,
    /// `Success` or the failure reason.
    pub message: String,
    /// Caller network origin, or `unknown`.
    pub ip: String,
    /// Severity.
    pub level: AuditLevel,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Placeholder for values the context could not provide.
pub const UNKNOWN: &str = "unknown";

/// Renders a caller address for the audit trail.
///
/// IPv6 loopback and IPv4-mapped addresses collapse to their IPv4 form.
#[must_use]
pub fn format_origin(origin: Option<IpAddr>) -> String {
    match origin.map(|ip| ip.to_canonical()) {
        None => UNKNOWN.to_string(),
        Some(IpAddr::V6(v6)) if v6.is_loopback() => Ipv4Addr::LOCALHOST.to_string(),
        Some(ip) => ip.to_string(),
    }
}
