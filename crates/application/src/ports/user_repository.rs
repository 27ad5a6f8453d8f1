//! User repository port

use async_trait::async_trait;
use warden_domain::{Provider, User};

use super::StoreError;

/// Durable store of local user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds the user bound to a provider account.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_user_id: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Inserts or updates a user, keyed by its `(email, provider)` id.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    async fn save(&self, user: &User) -> Result<(), StoreError>;
}
