//! In-process fakes of the ports for unit tests.

#![allow(clippy::unwrap_used, clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use warden_domain::{Provider, SecurityEvent, Session, User, UserId};

use crate::ports::{
    Clock, KeyValueStore, SecurityEventSink, SessionStore, StoreError, UserRepository,
};

pub const SECRET: &str = "0123456789abcdef0123456789abcdef-test-secret";

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()),
        })
    }

    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock();
        *now += TimeDelta::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

fn expiry(clock: &dyn Clock, ttl: Duration) -> DateTime<Utc> {
    clock.now() + TimeDelta::from_std(ttl).unwrap()
}

/// Key-value fake with clock-driven expiry.
pub struct MockKeyValue {
    clock: Arc<ManualClock>,
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl MockKeyValue {
    pub fn new(clock: Arc<ManualClock>) -> Arc<Self> {
        Arc::new(Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn ttl_of(&self, key_prefix: &str) -> Option<TimeDelta> {
        let entries = self.entries.lock();
        entries
            .iter()
            .find(|(k, _)| k.starts_with(key_prefix))
            .map(|(_, (_, exp))| *exp - self.clock.now())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }
}

#[async_trait]
impl KeyValueStore for MockKeyValue {
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let live = entries.get(key).filter(|(_, exp)| *exp > now).cloned();
        let (count, exp) = match live {
            Some((value, exp)) => (value.parse::<u64>().unwrap() + 1, exp),
            None => (1, expiry(self.clock.as_ref(), ttl)),
        };
        entries.insert(key.to_string(), (count.to_string(), exp));
        Ok(count)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let exp = expiry(self.clock.as_ref(), ttl);
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), (value.to_string(), exp));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        Ok(entries.get(key).is_some_and(|(_, exp)| *exp > now))
    }
}

/// Session fake. `fail` makes every call report an unavailable store.
pub struct MockSessions {
    clock: Arc<ManualClock>,
    sessions: Mutex<HashMap<UserId, Session>>,
    fail: bool,
}

impl MockSessions {
    pub fn new(clock: Arc<ManualClock>) -> Arc<Self> {
        Arc::new(Self {
            clock,
            sessions: Mutex::new(HashMap::new()),
            fail: false,
        })
    }

    pub fn failing(clock: Arc<ManualClock>) -> Arc<Self> {
        Arc::new(Self {
            clock,
            sessions: Mutex::new(HashMap::new()),
            fail: true,
        })
    }

    pub fn stored(&self, user_id: &UserId) -> Option<String> {
        let sessions = self.sessions.lock();
        sessions.get(user_id).map(|s| s.refresh_token.clone())
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::Unavailable("session store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for MockSessions {
    async fn put(&self, user_id: &UserId, refresh_token: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check()?;
        let session = Session {
            user_id: user_id.clone(),
            refresh_token: refresh_token.to_string(),
            expires_at: expiry(self.clock.as_ref(), ttl),
        };
        self.sessions
            .lock()
            .insert(user_id.clone(), session);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<Session>, StoreError> {
        self.check()?;
        let now = self.clock.now();
        let sessions = self.sessions.lock();
        Ok(sessions
            .get(user_id)
            .filter(|s| !s.is_expired_at(now))
            .cloned())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.check()?;
        self.sessions.lock().remove(user_id);
        Ok(())
    }

    async fn replace(
        &self,
        user_id: &UserId,
        expected: &str,
        refresh_token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.check()?;
        let exp = expiry(self.clock.as_ref(), ttl);
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(user_id) {
            Some(session) if session.refresh_token == expected => {
                session.refresh_token = refresh_token.to_string();
                session.expires_at = exp;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// User repository fake.
#[derive(Default)]
pub struct MockUsers {
    users: Mutex<Vec<User>>,
}

impl MockUsers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().clone()
    }
}

#[async_trait]
impl UserRepository for MockUsers {
    async fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_user_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.lock();
        Ok(users
            .iter()
            .find(|u| u.id.provider == provider && u.provider_user_id == provider_user_id)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock();
        users.retain(|u| u.id != user.id);
        users.push(user.clone());
        Ok(())
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().clone()
    }
}

impl SecurityEventSink for RecordingSink {
    fn publish(&self, event: SecurityEvent) {
        self.events.lock().push(event);
    }
}
