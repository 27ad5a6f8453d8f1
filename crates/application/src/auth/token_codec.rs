//! Compact signed credentials.
//!
//! Credentials are HS256 JSON Web Tokens carrying [`Claims`]. Expiry is
//! judged against the injected [`Clock`] rather than the wall clock, so the
//! library's own `exp` validation stays off.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use warden_domain::{AuthError, Claims, TokenKind, TokenPair, UserId, generate_token_id};

use crate::ports::Clock;
use crate::{ApplicationError, ApplicationResult};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// The signing secret cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SigningKeyError {
    /// Secret shorter than [`MIN_SECRET_LEN`].
    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    TooShort(usize),
}

/// Issues and verifies credentials with one symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    unverified: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec.
    ///
    /// # Errors
    /// Returns [`SigningKeyError::TooShort`] for a secret under
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(
        secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SigningKeyError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SigningKeyError::TooShort(secret.len()));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;

        // Claims peek used to rank expiry ahead of the signature.
        let mut unverified = validation.clone();
        unverified.insecure_disable_signature_validation();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            header: Header::new(ALGORITHM),
            validation,
            unverified,
            access_ttl,
            refresh_ttl,
            clock,
        })
    }

    /// Access credential lifetime.
    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh credential lifetime.
    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Builds and signs a credential of `kind` for `user_id`, valid for `ttl`.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Internal`] if the lifetime is out of range
    /// or the credential cannot be encoded.
    pub fn issue(&self, user_id: &UserId, kind: TokenKind, ttl: Duration) -> ApplicationResult<String> {
        let iat = self.clock.now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| ApplicationError::Internal(format!("{kind} lifetime out of range")))?;
        let claims = Claims {
            sub: user_id.email.clone(),
            provider: user_id.provider,
            typ: kind,
            jti: generate_token_id(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        };
        jsonwebtoken::encode(&self.header, &claims, &self.encoding)
            .map_err(|e| ApplicationError::Internal(format!("credential encoding: {e}")))
    }

    /// Issues a fresh access + refresh pair.
    ///
    /// # Errors
    /// See [`TokenCodec::issue`].
    pub fn issue_pair(&self, user_id: &UserId) -> ApplicationResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access, self.access_ttl)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)?,
            refresh_max_age_secs: i64::try_from(self.refresh_ttl.as_secs()).unwrap_or(i64::MAX),
        })
    }

    /// Parses a credential and checks its expiry, then its signature.
    ///
    /// An expired credential fails with [`AuthError::ExpiredCredential`]
    /// whether or not its signature is valid.
    ///
    /// # Errors
    /// One [`AuthError`] per failure cause: empty input, malformed
    /// structure, unsupported algorithm, expiry, bad signature.
    pub fn verify(&self, raw: &str) -> Result<Claims, AuthError> {
        let raw = self.checked_header(raw)?;
        let claims = self.decode(raw, &self.unverified)?;
        if claims.is_expired_at(self.clock.now()) {
            return Err(AuthError::ExpiredCredential);
        }
        self.decode(raw, &self.validation)
    }

    /// Like [`TokenCodec::verify`], additionally requiring the `typ` claim.
    ///
    /// # Errors
    /// [`AuthError::UnsupportedCredentialFormat`] when the credential is of
    /// the other kind, otherwise as [`TokenCodec::verify`].
    pub fn verify_kind(&self, raw: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.verify(raw)?;
        if claims.typ == kind {
            Ok(claims)
        } else {
            Err(AuthError::UnsupportedCredentialFormat(format!(
                "expected {kind} credential, got {}",
                claims.typ
            )))
        }
    }

    /// Time left until the credential expires; negative once it has.
    ///
    /// The signature is checked, expiry is not.
    ///
    /// # Errors
    /// Any structural or signature failure of [`TokenCodec::verify`].
    pub fn remaining_validity(&self, raw: &str) -> Result<TimeDelta, AuthError> {
        let raw = self.checked_header(raw)?;
        let claims = self.decode(raw, &self.validation)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::MalformedCredential("exp out of range".to_string()))?;
        Ok(expires_at - self.clock.now())
    }

    /// Rejects empty input and foreign algorithms before any claims are read.
    fn checked_header<'a>(&self, raw: &'a str) -> Result<&'a str, AuthError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AuthError::EmptyCredential);
        }
        let header = jsonwebtoken::decode_header(raw).map_err(|e| credential_error(&e))?;
        if header.alg == self.header.alg {
            Ok(raw)
        } else {
            Err(AuthError::UnsupportedCredentialFormat(format!(
                "algorithm {:?}",
                header.alg
            )))
        }
    }

    fn decode(&self, raw: &str, validation: &Validation) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(raw, &self.decoding, validation)
            .map(|data| data.claims)
            .map_err(|e| credential_error(&e))
    }
}

fn credential_error(err: &JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AuthError::UnsupportedCredentialFormat(err.to_string()),
        _ => AuthError::MalformedCredential(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use crate::testing::{ManualClock, SECRET};
    use warden_domain::Provider;

    fn codec(clock: &Arc<ManualClock>) -> TokenCodec {
        TokenCodec::new(
            SECRET.as_bytes(),
            Duration::from_secs(1800),
            Duration::from_secs(14 * 24 * 3600),
            clock.clone(),
        )
        .unwrap()
    }

    fn alice() -> UserId {
        UserId::new("a@x.com", Provider::Google)
    }

    fn forge(header: &str, claims: &serde_json::Value, signature: &str) -> String {
        format!(
            "{}.{}.{signature}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    #[test]
    fn test_issue_then_verify() {
        let clock = ManualClock::new();
        let codec = codec(&clock);

        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.user_id(), alice());
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 60);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_same_instant_tokens_differ() {
        let clock = ManualClock::new();
        let codec = codec(&clock);

        let a = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let b = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_credential_wins_over_bad_signature() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let (unsigned, _) = token.rsplit_once('.').unwrap();
        let tampered = format!("{unsigned}.AAAA");

        clock.advance(61);

        assert_eq!(codec.verify(&token), Err(AuthError::ExpiredCredential));
        assert_eq!(codec.verify(&tampered), Err(AuthError::ExpiredCredential));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();

        clock.advance(59);
        assert!(codec.verify(&token).is_ok());
        clock.advance(1);
        assert_eq!(codec.verify(&token), Err(AuthError::ExpiredCredential));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let claims = codec.verify(&token).unwrap();
        let signature = token.rsplit('.').next().unwrap();

        let mut forged = serde_json::to_value(&claims).unwrap();
        forged["sub"] = "mallory@x.com".into();
        let forged = forge(r#"{"alg":"HS256","typ":"JWT"}"#, &forged, signature);

        assert_eq!(codec.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_foreign_key_fails_signature() {
        let clock = ManualClock::new();
        let other = TokenCodec::new(
            b"another-secret-that-is-long-enough!!",
            Duration::from_secs(60),
            Duration::from_secs(60),
            clock.clone(),
        )
        .unwrap();
        let token = other.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();

        assert_eq!(codec(&clock).verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_failure_causes_are_distinct() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let claims = serde_json::json!({"sub": "a@x.com"});

        assert_eq!(codec.verify(""), Err(AuthError::EmptyCredential));
        assert_eq!(codec.verify("   "), Err(AuthError::EmptyCredential));
        assert!(matches!(codec.verify("abc"), Err(AuthError::MalformedCredential(_))));
        assert!(matches!(codec.verify("a.b.c.d"), Err(AuthError::MalformedCredential(_))));
        assert!(matches!(
            codec.verify(&forge(r#"{"alg":"HS256"}"#, &claims, "sig")),
            Err(AuthError::MalformedCredential(_))
        ));
        assert!(matches!(
            codec.verify(&forge(r#"{"alg":"none"}"#, &claims, "")),
            Err(AuthError::MalformedCredential(_))
        ));
        assert!(matches!(
            codec.verify(&forge(r#"{"alg":"RS256"}"#, &claims, "sig")),
            Err(AuthError::UnsupportedCredentialFormat(_))
        ));
        assert!(matches!(
            codec.verify(&forge(r#"{"alg":"HS512"}"#, &claims, "sig")),
            Err(AuthError::UnsupportedCredentialFormat(_))
        ));
    }

    #[test]
    fn test_unsigned_credential_fails_signature() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(60)).unwrap();
        let (unsigned, _) = token.rsplit_once('.').unwrap();

        assert_eq!(codec.verify(&format!("{unsigned}.")), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_library_errors_map_to_causes() {
        let err = |kind: ErrorKind| credential_error(&JwtError::from(kind));

        assert_eq!(err(ErrorKind::InvalidSignature), AuthError::InvalidSignature);
        assert_eq!(err(ErrorKind::ExpiredSignature), AuthError::ExpiredCredential);
        assert!(matches!(
            err(ErrorKind::InvalidAlgorithm),
            AuthError::UnsupportedCredentialFormat(_)
        ));
        assert!(matches!(err(ErrorKind::InvalidToken), AuthError::MalformedCredential(_)));
        assert!(matches!(
            err(ErrorKind::MissingRequiredClaim("exp".into())),
            AuthError::MalformedCredential(_)
        ));
    }

    #[test]
    fn test_verify_kind() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let pair = codec.issue_pair(&alice()).unwrap();

        assert!(codec.verify_kind(&pair.refresh_token, TokenKind::Refresh).is_ok());
        assert!(matches!(
            codec.verify_kind(&pair.access_token, TokenKind::Refresh),
            Err(AuthError::UnsupportedCredentialFormat(_))
        ));
        assert_eq!(pair.refresh_max_age_secs, 14 * 24 * 3600);
    }

    #[test]
    fn test_remaining_validity() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(600)).unwrap();

        clock.advance(100);
        assert_eq!(codec.remaining_validity(&token).unwrap(), TimeDelta::seconds(500));

        clock.advance(700);
        assert_eq!(codec.remaining_validity(&token).unwrap(), TimeDelta::seconds(-200));
    }

    #[test]
    fn test_remaining_validity_checks_signature() {
        let clock = ManualClock::new();
        let codec = codec(&clock);
        let token = codec.issue(&alice(), TokenKind::Access, Duration::from_secs(600)).unwrap();
        let (unsigned, _) = token.rsplit_once('.').unwrap();

        assert_eq!(
            codec.remaining_validity(&format!("{unsigned}.AAAA")),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = TokenCodec::new(
            b"short",
            Duration::from_secs(60),
            Duration::from_secs(60),
            ManualClock::new(),
        );
        assert!(matches!(result, Err(SigningKeyError::TooShort(5))));
    }
}
