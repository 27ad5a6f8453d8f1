//! Early revocation of access credentials.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::ApplicationResult;
use crate::auth::TokenCodec;
use crate::ports::KeyValueStore;
use crate::timeout::within;

const KEY_PREFIX: &str = "revoked:";
const MARK_VALUE: &str = "logout";

/// Blocks access credentials before their natural expiry.
///
/// Marks are keyed by the SHA-256 of the credential and expire exactly when
/// the credential would have, so the registry never grows past the set of
/// still-valid credentials.
#[derive(Clone)]
pub struct RevocationRegistry {
    store: Arc<dyn KeyValueStore>,
    codec: TokenCodec,
    store_timeout: Duration,
}

impl RevocationRegistry {
    /// Creates a registry.
    pub fn new(store: Arc<dyn KeyValueStore>, codec: TokenCodec, store_timeout: Duration) -> Self {
        Self {
            store,
            codec,
            store_timeout,
        }
    }

    /// Marks `access_token` as revoked for the rest of its validity.
    ///
    /// A credential that has already expired needs no mark and is left alone.
    ///
    /// # Errors
    /// Credential failures from [`TokenCodec::remaining_validity`], store
    /// failures and timeouts.
    pub async fn revoke(&self, access_token: &str) -> ApplicationResult<()> {
        let remaining = self.codec.remaining_validity(access_token)?;
        let Ok(ttl) = remaining.to_std() else {
            return Ok(());
        };
        if ttl.is_zero() {
            return Ok(());
        }
        within(
            self.store_timeout,
            "revocation.set",
            self.store.set_with_ttl(&mark_key(access_token), MARK_VALUE, ttl),
        )
        .await?;
        tracing::debug!(ttl_secs = ttl.as_secs(), "Access credential revoked");
        Ok(())
    }

    /// Returns true while a mark exists for `access_token`.
    ///
    /// # Errors
    /// Store failures and timeouts.
    pub async fn is_revoked(&self, access_token: &str) -> ApplicationResult<bool> {
        within(
            self.store_timeout,
            "revocation.exists",
            self.store.exists(&mark_key(access_token)),
        )
        .await
    }
}

fn mark_key(access_token: &str) -> String {
    let digest = Sha256::digest(access_token.trim().as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MockKeyValue, SECRET};
    use chrono::TimeDelta;
    use warden_domain::{Provider, TokenKind, UserId};

    struct Fixture {
        clock: Arc<ManualClock>,
        store: Arc<MockKeyValue>,
        codec: TokenCodec,
        registry: RevocationRegistry,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::new();
        let store = MockKeyValue::new(clock.clone());
        let codec = TokenCodec::new(
            SECRET.as_bytes(),
            Duration::from_secs(1800),
            Duration::from_secs(3600),
            clock.clone(),
        )
        .unwrap();
        let registry = RevocationRegistry::new(store.clone(), codec.clone(), Duration::from_secs(1));
        Fixture {
            clock,
            store,
            codec,
            registry,
        }
    }

    fn token(f: &Fixture, ttl: u64) -> String {
        f.codec
            .issue(
                &UserId::new("a@x.com", Provider::Google),
                TokenKind::Access,
                Duration::from_secs(ttl),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_mark_lives_as_long_as_the_token() {
        let f = fixture();
        let access = token(&f, 600);
        f.clock.advance(100);

        f.registry.revoke(&access).await.unwrap();

        assert!(f.registry.is_revoked(&access).await.unwrap());
        assert_eq!(f.store.ttl_of(KEY_PREFIX), Some(TimeDelta::seconds(500)));

        f.clock.advance(500);
        assert!(!f.registry.is_revoked(&access).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_is_not_marked() {
        let f = fixture();
        let access = token(&f, 60);
        f.clock.advance(60);

        f.registry.revoke(&access).await.unwrap();

        assert_eq!(f.store.entry_count(), 0);
        assert!(!f.registry.is_revoked(&access).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_tokens_stay_valid() {
        let f = fixture();
        let first = token(&f, 600);
        let second = token(&f, 600);

        f.registry.revoke(&first).await.unwrap();

        assert!(f.registry.is_revoked(&first).await.unwrap());
        assert!(!f.registry.is_revoked(&second).await.unwrap());
    }

    #[test]
    fn test_mark_key_does_not_contain_the_token() {
        let key = mark_key("header.payload.signature");
        assert!(key.starts_with(KEY_PREFIX));
        assert!(!key.contains("payload"));
        assert_eq!(key.len(), KEY_PREFIX.len() + 64);
    }
}
