//! Session store port
//!
//! Durable mapping from identity to its single active refresh credential.

use std::time::Duration;

use async_trait::async_trait;
use warden_domain::{Session, UserId};

use super::StoreError;

/// Repository trait for refresh sessions.
///
/// There is at most one session per identity. Sessions expire on their
/// own after the `ttl` they were written with.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes the session for `user_id`, replacing any existing one.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn put(&self, user_id: &UserId, refresh_token: &str, ttl: Duration)
    -> Result<(), StoreError>;

    /// Loads the active session, `None` if absent or expired.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn get(&self, user_id: &UserId) -> Result<Option<Session>, StoreError>;

    /// Deletes the session. Deleting an absent session is not an error.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Replaces the session only if its current refresh value equals
    /// `expected`, as one atomic step.
    ///
    /// Returns false when the session is gone or holds another value, which
    /// is how concurrent rotations of the same refresh credential resolve to
    /// a single winner.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn replace(
        &self,
        user_id: &UserId,
        expected: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;
}
