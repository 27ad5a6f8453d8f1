//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. a TOML file (`WARDEN_CONFIG`, or `./warden.toml` when present)
//! 3. environment variables `WARDEN__<SECTION>__<KEY>`, e.g.
//!    `WARDEN__AUTH__SIGNING_SECRET`
//!
//! The signing secret has no default.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;
use warden_application::AuthSettings;
use warden_application::auth::MIN_SECRET_LEN;
use warden_domain::Provider;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG";

const ENV_PREFIX: &str = "WARDEN";
const DEFAULT_FILE: &str = "warden";

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Values were read but are not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Refresh cookie attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// Cookie path scope.
    pub path: String,
    /// Whether the `Secure` attribute is set.
    pub secure: bool,
}

/// HTTP surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Front-end origin that provider logins redirect back to.
    pub allowed_origin: Url,
    /// Refresh cookie attributes.
    pub cookie: CookieSettings,
}

impl ServerSettings {
    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Client registration at one identity provider.
#[derive(Clone, Deserialize)]
pub struct ProviderSettings {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Token endpoint override.
    #[serde(default)]
    pub token_url: Option<String>,
    /// Userinfo endpoint override.
    #[serde(default)]
    pub userinfo_url: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

impl ProviderSettings {
    /// Token endpoint for `provider`.
    #[must_use]
    pub fn token_url(&self, provider: Provider) -> &str {
        self.token_url.as_deref().unwrap_or(match provider {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Kakao => "https://kauth.kakao.com/oauth/token",
        })
    }

    /// Userinfo endpoint for `provider`.
    #[must_use]
    pub fn userinfo_url(&self, provider: Provider) -> &str {
        self.userinfo_url.as_deref().unwrap_or(match provider {
            Provider::Google => "https://www.googleapis.com/oauth2/v3/userinfo",
            Provider::Kakao => "https://kapi.kakao.com/v2/user/me",
        })
    }
}

/// Registered providers. An absent entry disables that provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersSettings {
    /// Google registration.
    #[serde(default)]
    pub google: Option<ProviderSettings>,
    /// Kakao registration.
    #[serde(default)]
    pub kakao: Option<ProviderSettings>,
}

impl ProvidersSettings {
    /// Registration of `provider`, if configured.
    #[must_use]
    pub const fn get(&self, provider: Provider) -> Option<&ProviderSettings> {
        match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Kakao => self.kakao.as_ref(),
        }
    }
}

/// In-memory store maintenance.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Seconds between sweeps of expired entries.
    pub sweep_interval_secs: u64,
}

impl StoreSettings {
    /// Sweep period.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Complete process settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// HTTP surface.
    pub server: ServerSettings,
    /// Authentication engine.
    pub auth: AuthSettings,
    /// Identity providers.
    #[serde(default)]
    pub providers: ProvidersSettings,
    /// Store maintenance.
    pub store: StoreSettings,
}

impl Settings {
    /// Loads settings from the file named by `WARDEN_CONFIG` (or an optional
    /// `./warden.toml`) and the environment.
    ///
    /// # Errors
    /// See [`Settings::load_from`].
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().map(Path::new))
    }

    /// Loads settings with `path` as the file layer. A given path must
    /// exist; without one, `./warden.toml` is used if present.
    ///
    /// # Errors
    /// Unreadable sources, missing required keys, an unusable secret.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = path.map_or_else(
            || File::with_name(DEFAULT_FILE).required(false),
            |p| File::from(p).required(true),
        );

        let settings: Self = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.allowed_origin", "http://localhost:3000")?
            .set_default("server.cookie.name", "refreshToken")?
            .set_default("server.cookie.path", "/")?
            .set_default("server.cookie.secure", true)?
            .set_default("store.sweep_interval_secs", 60_i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let secret_len = self.auth.signing_secret.len();
        if secret_len < MIN_SECRET_LEN {
            return Err(SettingsError::Invalid(format!(
                "auth.signing_secret must be at least {MIN_SECRET_LEN} bytes, got {secret_len}"
            )));
        }
        if self.auth.access_ttl_secs == 0 || self.auth.refresh_ttl_secs == 0 {
            return Err(SettingsError::Invalid("token lifetimes must be positive".to_string()));
        }
        if self.store.sweep_interval_secs == 0 {
            return Err(SettingsError::Invalid("store.sweep_interval_secs must be positive".to_string()));
        }
        if self.auth.access_ttl_secs >= self.auth.refresh_ttl_secs {
            return Err(SettingsError::Invalid(
                "auth.access_ttl_secs must be shorter than auth.refresh_ttl_secs".to_string(),
            ));
        }
        Ok(())
    }
}
