//! In-memory expiring key-value store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use warden_application::ports::{Clock, KeyValueStore, StoreError};

use super::Expiring;

#[derive(Debug, Clone)]
enum Value {
    Counter(u64),
    Text(String),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// Process-local stand-in for an expiring key-value server.
///
/// Every mutation happens under one write lock, which gives
/// `incr_with_expiry` the same atomicity as a server-side increment.
/// A read that finds an expired entry removes it; [`spawn_sweeper`](super::spawn_sweeper)
/// clears the ones nobody reads again.
#[derive(Clone)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>, StoreError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|_| StoreError::Backend(format!("ttl out of range: {ttl:?}")))?;
        Ok(self.clock.now() + ttl)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => match &mut entry.value {
                Value::Counter(count) => {
                    *count += 1;
                    Ok(*count)
                }
                Value::Text(_) => Err(StoreError::Backend(format!(
                    "value at `{key}` is not a counter"
                ))),
            },
            _ => {
                let expires_at = self.expiry(ttl)?;
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Counter(1),
                        expires_at,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = self.expiry(ttl)?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        match self.entries.read().await.get(key) {
            None => return Ok(false),
            Some(entry) if entry.expires_at > now => return Ok(true),
            Some(_) => {}
        }
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        Ok(entries.get(key).is_some_and(|e| e.expires_at > now))
    }
}

#[async_trait]
impl Expiring for InMemoryKeyValueStore {
    fn name(&self) -> &'static str {
        "key_value"
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}
