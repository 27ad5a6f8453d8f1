//! Fixed-window rate limiting over the key-value store.

use std::sync::Arc;
use std::time::Duration;

use warden_domain::{AuthError, UserId};

use crate::ApplicationResult;
use crate::ports::KeyValueStore;
use crate::settings::{LimitedOperation, RateLimitSettings};
use crate::timeout::within;

const KEY_PREFIX: &str = "rate_limit:";

/// Counts calls per key in windows that start with the first call.
///
/// The count and the window expiry live in the store; the store's atomic
/// increment is the only synchronisation.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    policies: RateLimitSettings,
    store_timeout: Duration,
}

impl RateLimiter {
    /// Creates a limiter with per-operation `policies`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        policies: RateLimitSettings,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            policies,
            store_timeout,
        }
    }

    /// Counts one call against `key` and reports whether it is within `limit`
    /// for the current `window`.
    ///
    /// # Errors
    /// Store failures and timeouts. A failed count never allows the call.
    pub async fn allow(&self, key: &str, limit: u64, window: Duration) -> ApplicationResult<bool> {
        let key = format!("{KEY_PREFIX}{key}");
        let count = within(
            self.store_timeout,
            "rate_limit.incr",
            self.store.incr_with_expiry(&key, window),
        )
        .await?;
        Ok(count <= limit)
    }

    /// Applies the configured policy of `operation` to `user_id`.
    ///
    /// Operations without a policy are always allowed.
    ///
    /// # Errors
    /// [`AuthError::RateLimitExceeded`] once the budget is spent, or a
    /// store failure.
    pub async fn check(&self, operation: LimitedOperation, user_id: &UserId) -> ApplicationResult<()> {
        let Some(policy) = self.policies.policy(operation) else {
            return Ok(());
        };
        let key = format!("{}:{}", operation.as_str(), user_id.key());
        if self.allow(&key, policy.limit, policy.window()).await? {
            Ok(())
        } else {
            tracing::debug!(key = %key, limit = policy.limit, "Rate limit budget spent");
            Err(AuthError::RateLimitExceeded(key).into())
        }
    }
}
