//! In-memory user repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_application::ports::{StoreError, UserRepository};
use warden_domain::{Provider, User, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    by_account: HashMap<(Provider, String), UserId>,
}

/// Users keyed by `(email, provider)`, with a secondary index on the
/// provider account.
///
/// Saving a user whose id already exists replaces that record, so one
/// identity never maps to two records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_user_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_account
            .get(&(provider, provider_user_id.to_string()))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let account = (user.id.provider, user.provider_user_id.clone());
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        if let Some(previous) = tables.users.get(&user.id)
            && previous.provider_user_id != user.provider_user_id
        {
            let stale = (previous.id.provider, previous.provider_user_id.clone());
            tables.by_account.remove(&stale);
        }
        if let Some(owner) = tables.by_account.get(&account)
            && owner != &user.id
        {
            tables.users.remove(owner);
        }

        tables.by_account.insert(account, user.id.clone());
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
