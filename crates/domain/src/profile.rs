//! Provider userinfo payloads.
//!
//! Each supported provider shapes its userinfo response differently. The
//! closed [`ProviderProfile`] union normalises them behind the same four
//! accessors. Optional fields the provider left out stay `None`; empty
//! strings are treated as missing too.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AuthError;
use crate::identity::Provider;

/// Google `userinfo` response (subset).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

/// Kakao `/v2/user/me` response (subset).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KakaoProfile {
    id: Option<KakaoId>,
    #[serde(default)]
    properties: Option<KakaoProperties>,
    #[serde(default)]
    kakao_account: Option<KakaoAccount>,
}

/// Kakao sends the account id as a JSON number; some proxies stringify it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum KakaoId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    ci: Option<String>,
}

/// A parsed provider profile, one variant per supported provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderProfile {
    /// Google account.
    Google {
        /// `sub` claim.
        id: String,
        /// Parsed payload.
        profile: GoogleProfile,
    },
    /// Kakao account.
    Kakao {
        /// Account id, stringified.
        id: String,
        /// Parsed payload.
        profile: KakaoProfile,
    },
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl ProviderProfile {
    /// Parses a raw userinfo payload for `provider`.
    ///
    /// # Errors
    /// Returns [`AuthError::IncompleteProfile`] if the payload cannot be
    /// decoded or lacks the provider account id.
    pub fn parse(provider: Provider, raw: &Value) -> Result<Self, AuthError> {
        match provider {
            Provider::Google => {
                let profile: GoogleProfile = serde_json::from_value(raw.clone())
                    .map_err(|_| AuthError::IncompleteProfile("profile"))?;
                let id = present(profile.sub.as_ref())
                    .ok_or(AuthError::IncompleteProfile("id"))?
                    .to_string();
                Ok(Self::Google { id, profile })
            }
            Provider::Kakao => {
                let profile: KakaoProfile = serde_json::from_value(raw.clone())
                    .map_err(|_| AuthError::IncompleteProfile("profile"))?;
                let id = match &profile.id {
                    Some(KakaoId::Number(n)) => n.to_string(),
                    Some(KakaoId::Text(s)) if !s.trim().is_empty() => s.clone(),
                    _ => return Err(AuthError::IncompleteProfile("id")),
                };
                Ok(Self::Kakao { id, profile })
            }
        }
    }

    /// Provider the profile came from.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        match self {
            Self::Google { .. } => Provider::Google,
            Self::Kakao { .. } => Provider::Kakao,
        }
    }

    /// Provider-side account id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Google { id, .. } | Self::Kakao { id, .. } => id,
        }
    }

    /// Display name.
    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Self::Google { profile, .. } => present(profile.name.as_ref()),
            Self::Kakao { profile, .. } => profile
                .properties
                .as_ref()
                .and_then(|p| present(p.nickname.as_ref())),
        }
    }

    /// Account e-mail.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Google { profile, .. } => present(profile.email.as_ref()),
            Self::Kakao { profile, .. } => profile
                .kakao_account
                .as_ref()
                .and_then(|a| present(a.email.as_ref())),
        }
    }

    /// Verified national identifier. Google never supplies one.
    #[must_use]
    pub fn verified_identifier(&self) -> Option<&str> {
        match self {
            Self::Google { .. } => None,
            Self::Kakao { profile, .. } => profile
                .kakao_account
                .as_ref()
                .and_then(|a| present(a.ci.as_ref())),
        }
    }
}

/// What identity resolution receives once a provider login completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCallback {
    /// Provider that authenticated the user.
    pub provider: Provider,
    /// Provider-side account id.
    pub provider_user_id: String,
    /// Raw userinfo fields.
    pub raw_profile: Value,
}

impl ProviderCallback {
    /// Builds a callback from a provider's userinfo response.
    ///
    /// # Errors
    /// Returns [`AuthError::IncompleteProfile`] when the account id is missing.
    pub fn from_userinfo(provider: Provider, raw_profile: Value) -> Result<Self, AuthError> {
        let provider_user_id = ProviderProfile::parse(provider, &raw_profile)?
            .id()
            .to_string();
        Ok(Self {
            provider,
            provider_user_id,
            raw_profile,
        })
    }
}
