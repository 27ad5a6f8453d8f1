//! Maps provider profiles onto local identities.

use std::sync::Arc;
use std::time::Duration;

use warden_domain::{AuthError, ProviderCallback, ProviderProfile, User, UserId};

use crate::ApplicationResult;
use crate::ports::{Clock, UserRepository};
use crate::timeout::within;

/// Creates or refreshes the local user behind a provider login.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl IdentityResolver {
    /// Creates a resolver.
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>, store_timeout: Duration) -> Self {
        Self {
            users,
            clock,
            store_timeout,
        }
    }

    /// Resolves `callback` to a stored user.
    ///
    /// An existing user (looked up by provider and provider account id) gets
    /// its display fields and last-login time refreshed; absent profile
    /// fields keep their stored values. Otherwise a new user is created
    /// from the profile.
    ///
    /// # Errors
    /// [`AuthError::IncompleteProfile`] when the payload has no usable
    /// e-mail, store failures and timeouts.
    pub async fn resolve(&self, callback: &ProviderCallback) -> ApplicationResult<User> {
        let profile = ProviderProfile::parse(callback.provider, &callback.raw_profile)?;
        let nickname = profile.nickname().map(str::to_string);
        let verified_identifier = profile.verified_identifier().map(str::to_string);
        let now = self.clock.now();

        let existing = within(
            self.store_timeout,
            "users.find_by_provider_id",
            self.users
                .find_by_provider_id(callback.provider, &callback.provider_user_id),
        )
        .await?;

        let user = if let Some(mut user) = existing {
            user.record_login(nickname, verified_identifier, now);
            user
        } else {
            let email = profile.email().ok_or(AuthError::IncompleteProfile("email"))?;
            tracing::info!(provider = %callback.provider, "Creating user for first provider login");
            User::new(
                UserId::new(email, callback.provider),
                callback.provider_user_id.clone(),
                nickname,
                verified_identifier,
                now,
            )
        };

        within(self.store_timeout, "users.save", self.users.save(&user)).await?;
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ApplicationError;
    use crate::testing::{ManualClock, MockUsers};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use warden_domain::Provider;

    fn resolver(clock: &Arc<ManualClock>, users: &Arc<MockUsers>) -> IdentityResolver {
        IdentityResolver::new(users.clone(), clock.clone(), Duration::from_secs(1))
    }

    fn kakao(raw: serde_json::Value) -> ProviderCallback {
        ProviderCallback::from_userinfo(Provider::Kakao, raw).unwrap()
    }

    #[tokio::test]
    async fn test_first_login_creates_user() {
        let clock = ManualClock::new();
        let users = MockUsers::new();
        let callback = ProviderCallback::from_userinfo(
            Provider::Google,
            json!({"sub": "u1", "name": "Alice", "email": "a@x.com"}),
        )
        .unwrap();

        let user = resolver(&clock, &users).resolve(&callback).await.unwrap();

        assert_eq!(user.id, UserId::new("a@x.com", Provider::Google));
        assert_eq!(user.provider_user_id, "u1");
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert_eq!(user.verified_identifier, None);
        assert_eq!(users.all(), vec![user]);
    }

    #[tokio::test]
    async fn test_missing_optional_fields_stay_absent() {
        let clock = ManualClock::new();
        let users = MockUsers::new();
        let callback = kakao(json!({"id": 42, "kakao_account": {"email": "k@x.com"}}));

        let user = resolver(&clock, &users).resolve(&callback).await.unwrap();

        assert_eq!(user.provider_user_id, "42");
        assert_eq!(user.display_name, None);
        assert_eq!(user.verified_identifier, None);
    }

    #[tokio::test]
    async fn test_repeat_login_updates_display_fields() {
        let clock = ManualClock::new();
        let users = MockUsers::new();
        let resolver = resolver(&clock, &users);
        let first = kakao(json!({
            "id": 42,
            "properties": {"nickname": "kim"},
            "kakao_account": {"email": "k@x.com", "ci": "ci-1"}
        }));
        let created = resolver.resolve(&first).await.unwrap();

        clock.advance(3600);
        let second = kakao(json!({
            "id": 42,
            "properties": {"nickname": "kim2"},
            "kakao_account": {"email": "k@x.com"}
        }));
        let updated = resolver.resolve(&second).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.display_name.as_deref(), Some("kim2"));
        assert_eq!(updated.verified_identifier.as_deref(), Some("ci-1"));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(
            updated.last_login_at - created.last_login_at,
            chrono::TimeDelta::seconds(3600)
        );
        assert_eq!(users.all().len(), 1);
    }

    #[tokio::test]
    async fn test_new_user_without_email_is_rejected() {
        let clock = ManualClock::new();
        let users = MockUsers::new();
        let callback = kakao(json!({"id": 7, "properties": {"nickname": "anon"}}));

        let err = resolver(&clock, &users).resolve(&callback).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Auth(AuthError::IncompleteProfile("email"))
        ));
        assert!(users.all().is_empty());
    }
}
