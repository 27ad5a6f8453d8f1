//! Expiring key-value store port
//!
//! Backs the volatile state of the engine: revocation marks and rate
//! windows. Every key carries its own time-to-live.

use std::time::Duration;

use async_trait::async_trait;

use super::StoreError;

/// Port for a fast key-value store with per-key expiry (Redis-like).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically increments the counter at `key` and returns the new value.
    ///
    /// When this increment creates the key (0 → 1) the expiry is set to
    /// `ttl` in the same atomic step. Later increments leave the expiry
    /// untouched.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or the key holds a
    /// non-counter value.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;

    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
    -> Result<(), StoreError>;

    /// Returns true if `key` exists and has not expired.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}
