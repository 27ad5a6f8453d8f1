//! Clock port for time-related operations

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Every expiry decision (credential `exp`, session lifetime, revocation
/// marks, rate windows) reads time through this port, so tests can move
/// time forward deterministically.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
