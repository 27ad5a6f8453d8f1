//! Authorization-code login against Google and Kakao.
//!
//! The gateway exchanges the authorization code at the provider's token
//! endpoint, then fetches the userinfo document with the provider access
//! token. The provider token itself is discarded afterwards.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use warden_application::ports::{ProviderError, ProviderGateway};
use warden_domain::Provider;

use crate::settings::{ProviderSettings, ProvidersSettings};

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Token endpoint success response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// [`ProviderGateway`] over HTTPS with `reqwest`.
pub struct ReqwestProviderGateway {
    client: Client,
    providers: ProvidersSettings,
}

impl ReqwestProviderGateway {
    /// Creates a gateway for the configured providers.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(providers: ProvidersSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self::with_client(client, providers))
    }

    /// Creates a gateway with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, providers: ProvidersSettings) -> Self {
        Self { client, providers }
    }

    async fn exchange_code(
        &self,
        provider: Provider,
        registration: &ProviderSettings,
        code: &str,
    ) -> Result<String, ProviderError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", registration.client_id.as_str()),
            ("client_secret", registration.client_secret.as_str()),
            ("redirect_uri", registration.redirect_uri.as_str()),
        ];
        let body = serde_urlencoded::to_string(params)
            .map_err(|e| ProviderError::Exchange(format!("Failed to encode form: {e}")))?;

        let response = self
            .client
            .post(registration.token_url(provider))
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<TokenErrorResponse>(&error_text) {
                return Err(ProviderError::Exchange(
                    error_response
                        .error_description
                        .unwrap_or(error_response.error),
                ));
            }
            return Err(ProviderError::Exchange(format!(
                "Token request failed with {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Exchange(format!("Failed to parse token response: {e}")))?;
        if let Some(kind) = token.token_type.as_deref()
            && !kind.eq_ignore_ascii_case("bearer")
        {
            return Err(ProviderError::Exchange(format!("Unsupported token type `{kind}`")));
        }
        Ok(token.access_token)
    }

    async fn userinfo(
        &self,
        provider: Provider,
        registration: &ProviderSettings,
        access_token: &str,
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(registration.userinfo_url(provider))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::UserInfo(format!(
                "Userinfo request failed with {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ProviderError::UserInfo(format!("Failed to parse userinfo: {e}")))
    }
}

#[async_trait]
impl ProviderGateway for ReqwestProviderGateway {
    async fn fetch_userinfo(
        &self,
        provider: Provider,
        authorization_code: &str,
    ) -> Result<Value, ProviderError> {
        let registration = self
            .providers
            .get(provider)
            .ok_or(ProviderError::NotConfigured(provider))?;

        let access_token = self
            .exchange_code(provider, registration, authorization_code)
            .await?;
        tracing::debug!(%provider, "Authorization code exchanged");
        self.userinfo(provider, registration, &access_token).await
    }
}
