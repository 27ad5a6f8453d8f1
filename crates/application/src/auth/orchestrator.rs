//! Session lifecycle: login, rotation, logout and access checks.

use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;
use warden_domain::{
    AuditOperation, AuthError, ProviderCallback, TokenKind, TokenPair, User, UserId,
};

use crate::auth::{
    IdentityResolver, RateLimiter, RequestContext, RevocationRegistry, SecurityAudit,
    SigningKeyError, TokenCodec,
};
use crate::ports::{Clock, KeyValueStore, SecurityEventSink, SessionStore, UserRepository};
use crate::settings::{AuthSettings, LimitedOperation};
use crate::timeout::within;
use crate::{ApplicationError, ApplicationResult};

/// Adapters the orchestrator runs against.
#[derive(Clone)]
pub struct AuthPorts {
    /// Time source for issuance and expiry.
    pub clock: Arc<dyn Clock>,
    /// Rate windows and revocation marks.
    pub key_value: Arc<dyn KeyValueStore>,
    /// Refresh sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Local users.
    pub users: Arc<dyn UserRepository>,
    /// Audit event sink.
    pub events: Arc<dyn SecurityEventSink>,
}

/// Coordinates the codec, stores and limiter into the session state machine
/// `Anonymous -> Authenticated -> (rotated)* -> Revoked`.
///
/// Every public operation is audited. One session is kept per identity, so
/// a new login ends the refresh ability of any earlier one.
#[derive(Clone)]
pub struct AuthOrchestrator {
    codec: TokenCodec,
    rate_limiter: RateLimiter,
    revocations: RevocationRegistry,
    resolver: IdentityResolver,
    audit: SecurityAudit,
    sessions: Arc<dyn SessionStore>,
    store_timeout: Duration,
}

impl AuthOrchestrator {
    /// Wires the engine from settings and adapters.
    ///
    /// # Errors
    /// Returns [`SigningKeyError`] if the configured secret is unusable.
    pub fn new(settings: &AuthSettings, ports: AuthPorts) -> Result<Self, SigningKeyError> {
        let store_timeout = settings.store_timeout();
        let codec = TokenCodec::new(
            settings.signing_secret.as_bytes(),
            settings.access_ttl(),
            settings.refresh_ttl(),
            ports.clock.clone(),
        )?;
        Ok(Self {
            rate_limiter: RateLimiter::new(
                ports.key_value.clone(),
                settings.rate_limits.clone(),
                store_timeout,
            ),
            revocations: RevocationRegistry::new(ports.key_value, codec.clone(), store_timeout),
            resolver: IdentityResolver::new(ports.users, ports.clock.clone(), store_timeout),
            audit: SecurityAudit::new(ports.events, ports.clock),
            sessions: ports.sessions,
            codec,
            store_timeout,
        })
    }

    /// The credential codec.
    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The audit trail.
    #[must_use]
    pub const fn audit(&self) -> &SecurityAudit {
        &self.audit
    }

    /// Issues a fresh pair for `user_id` and makes its refresh value the
    /// only valid one for that identity.
    ///
    /// # Errors
    /// Rate limiting, store failures and timeouts.
    pub async fn complete_login(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> ApplicationResult<TokenPair> {
        let ctx = ctx.with_actor(user_id.clone());
        self.audit
            .observe(AuditOperation::Login, &ctx, self.login(&ctx, user_id))
            .await
    }

    /// Resolves the provider identity, then completes login for it.
    ///
    /// # Errors
    /// Profile failures from [`IdentityResolver::resolve`], then as
    /// [`AuthOrchestrator::complete_login`].
    pub async fn complete_provider_login(
        &self,
        ctx: &RequestContext,
        callback: &ProviderCallback,
    ) -> ApplicationResult<(User, TokenPair)> {
        let user = self
            .resolver
            .resolve(callback)
            .await
            .inspect_err(|e| self.audit.record_failure(AuditOperation::Login, ctx, e))?;
        let pair = self.complete_login(ctx, &user.id).await?;
        Ok((user, pair))
    }

    /// Exchanges a refresh credential for a new pair.
    ///
    /// The presented value must equal the stored session value. A match is
    /// consumed by an atomic swap, so of several concurrent calls with the
    /// same value exactly one succeeds; an older, already rotated value
    /// fails with [`AuthError::RefreshValueMismatch`].
    ///
    /// # Errors
    /// Credential failures, [`AuthError::RateLimitExceeded`],
    /// [`AuthError::SessionNotFound`], [`AuthError::RefreshValueMismatch`],
    /// store failures and timeouts.
    pub async fn reissue(
        &self,
        ctx: &RequestContext,
        presented_refresh: &str,
    ) -> ApplicationResult<TokenPair> {
        let presented = presented_refresh.trim();
        let claims = self
            .codec
            .verify_kind(presented, TokenKind::Refresh)
            .map_err(ApplicationError::from)
            .inspect_err(|e| self.audit.record_failure(AuditOperation::TokenReissue, ctx, e))?;
        let user_id = claims.user_id();
        let ctx = ctx.with_actor(user_id.clone());
        self.audit
            .observe(
                AuditOperation::TokenReissue,
                &ctx,
                self.rotate(&ctx, &user_id, presented),
            )
            .await
    }

    /// Ends the caller's session and revokes the presented access credential.
    ///
    /// Session deletion and revocation run concurrently; both are attempted
    /// even if one fails, and the first failure is returned.
    ///
    /// # Errors
    /// [`AuthError::Unauthenticated`] without an actor in `ctx`, rate
    /// limiting, store failures and timeouts.
    pub async fn logout(
        &self,
        ctx: &RequestContext,
        access_token: Option<&str>,
    ) -> ApplicationResult<()> {
        self.audit
            .observe(AuditOperation::Logout, ctx, self.end_session(ctx, access_token))
            .await
    }

    /// Verifies an access credential and checks it has not been revoked.
    ///
    /// A revoked credential fails with [`AuthError::Unauthenticated`], which
    /// shares its public code with a bad signature.
    ///
    /// # Errors
    /// Credential failures, [`AuthError::Unauthenticated`], store failures
    /// and timeouts.
    pub async fn is_authorized(
        &self,
        ctx: &RequestContext,
        access_token: &str,
    ) -> ApplicationResult<UserId> {
        let result = self.authorize(access_token).await;
        match &result {
            Ok(user_id) => self.audit.record_outcome(
                AuditOperation::AccessCheck,
                &ctx.with_actor(user_id.clone()),
                &result,
            ),
            Err(e) => self.audit.record_failure(AuditOperation::AccessCheck, ctx, e),
        }
        result
    }

    async fn login(&self, ctx: &RequestContext, user_id: &UserId) -> ApplicationResult<TokenPair> {
        self.enforce(ctx, LimitedOperation::Login, user_id).await?;
        let pair = self.codec.issue_pair(user_id)?;
        within(
            self.store_timeout,
            "sessions.put",
            self.sessions
                .put(user_id, &pair.refresh_token, self.codec.refresh_ttl()),
        )
        .await?;
        Ok(pair)
    }

    async fn rotate(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        presented: &str,
    ) -> ApplicationResult<TokenPair> {
        self.enforce(ctx, LimitedOperation::Reissue, user_id).await?;

        let session = within(self.store_timeout, "sessions.get", self.sessions.get(user_id))
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        let matches: bool = session
            .refresh_token
            .as_bytes()
            .ct_eq(presented.as_bytes())
            .into();
        if !matches {
            tracing::warn!(user = %user_id, "Rotated refresh credential presented again");
            return Err(AuthError::RefreshValueMismatch.into());
        }

        let pair = self.codec.issue_pair(user_id)?;
        let swapped = within(
            self.store_timeout,
            "sessions.replace",
            self.sessions.replace(
                user_id,
                presented,
                &pair.refresh_token,
                self.codec.refresh_ttl(),
            ),
        )
        .await?;
        if !swapped {
            tracing::warn!(user = %user_id, "Lost a concurrent refresh rotation");
            return Err(AuthError::RefreshValueMismatch.into());
        }
        Ok(pair)
    }

    async fn end_session(
        &self,
        ctx: &RequestContext,
        access_token: Option<&str>,
    ) -> ApplicationResult<()> {
        let user_id = ctx.actor().ok_or(AuthError::Unauthenticated)?;
        self.enforce(ctx, LimitedOperation::Logout, user_id).await?;

        let delete = within(self.store_timeout, "sessions.delete", self.sessions.delete(user_id));
        let revoke = async {
            match access_token {
                Some(token) => self.revocations.revoke(token).await,
                None => Ok(()),
            }
        };
        let (deleted, revoked) = tokio::join!(delete, revoke);

        if let Err(e) = &deleted {
            tracing::error!(user = %user_id, error = %e, "Failed to delete session on logout");
        }
        if let Err(e) = &revoked {
            tracing::error!(user = %user_id, error = %e, "Failed to revoke access credential on logout");
        }
        deleted.and(revoked)
    }

    async fn authorize(&self, access_token: &str) -> ApplicationResult<UserId> {
        let claims = self.codec.verify_kind(access_token, TokenKind::Access)?;
        if self.revocations.is_revoked(access_token).await? {
            return Err(AuthError::Unauthenticated.into());
        }
        Ok(claims.user_id())
    }

    async fn enforce(
        &self,
        ctx: &RequestContext,
        operation: LimitedOperation,
        user_id: &UserId,
    ) -> ApplicationResult<()> {
        let result = self.rate_limiter.check(operation, user_id).await;
        if let Err(ApplicationError::Auth(AuthError::RateLimitExceeded(key))) = &result {
            self.audit.rate_limited(ctx, user_id, key);
        }
        result
    }
}
