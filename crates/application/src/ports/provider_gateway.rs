//! Identity provider gateway port

use async_trait::async_trait;
use serde_json::Value;
use warden_domain::Provider;

/// Errors that can occur while talking to an identity provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No client credentials are configured for the provider.
    #[error("provider not configured: {0}")]
    NotConfigured(Provider),

    /// The token endpoint rejected the authorization code.
    #[error("code exchange failed: {0}")]
    Exchange(String),

    /// The userinfo endpoint failed.
    #[error("userinfo request failed: {0}")]
    UserInfo(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Completes the provider side of a social login.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Exchanges an authorization code and returns the raw userinfo payload.
    ///
    /// # Errors
    /// Returns an error if the provider is not configured, the exchange is
    /// rejected, or the userinfo endpoint fails.
    async fn fetch_userinfo(
        &self,
        provider: Provider,
        authorization_code: &str,
    ) -> Result<Value, ProviderError>;
}
