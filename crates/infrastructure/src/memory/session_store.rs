//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use warden_application::ports::{Clock, SessionStore, StoreError};
use warden_domain::{Session, UserId};

use super::Expiring;

/// One session per identity, expiring with its refresh credential.
///
/// Lapsed sessions are removed when read or replaced, and by the sweeper.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
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
impl SessionStore for InMemorySessionStore {
    async fn put(&self, user_id: &UserId, refresh_token: &str, ttl: Duration) -> Result<(), StoreError> {
        let session = Session {
            user_id: user_id.clone(),
            refresh_token: refresh_token.to_string(),
            expires_at: self.expiry(ttl)?,
        };
        self.sessions.write().await.insert(user_id.clone(), session);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<Session>, StoreError> {
        let now = self.clock.now();
        match self.sessions.read().await.get(user_id) {
            None => return Ok(None),
            Some(session) if !session.is_expired_at(now) => return Ok(Some(session.clone())),
            Some(_) => {}
        }
        let mut sessions = self.sessions.write().await;
        if sessions.get(user_id).is_some_and(|s| s.is_expired_at(now)) {
            sessions.remove(user_id);
        }
        Ok(sessions.get(user_id).cloned())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }

    async fn replace(
        &self,
        user_id: &UserId,
        expected: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let expires_at = self.expiry(ttl)?;
        let mut sessions = self.sessions.write().await;
        if sessions.get(user_id).is_some_and(|s| s.is_expired_at(now)) {
            sessions.remove(user_id);
            return Ok(false);
        }
        match sessions.get_mut(user_id) {
            Some(session) if session.refresh_token == expected => {
                session.refresh_token = refresh_token.to_string();
                session.expires_at = expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl Expiring for InMemorySessionStore {
    fn name(&self) -> &'static str {
        "sessions"
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }
}
