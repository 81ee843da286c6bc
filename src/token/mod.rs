//! Credential signing and verification.
//!
//! Credentials are HS256 JWTs carrying the subject id, email, issued-at and
//! expiry. The secret is handed to [`TokenCodec::new`] once at start and is
//! never read from the environment afterwards.

mod error;

pub use error::{ConfigError, IssueError, VerifyFailure};

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Default credential lifetime handed out at registration.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Identity a credential is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub email: String,
}

/// Decoded credential payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CredentialClaims {
    /// Subject identifier.
    #[serde(rename = "id")]
    pub subject_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Current time as unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the process signing secret.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSecret`] if the secret is empty.
    pub fn new(secret: &SecretString) -> Result<Self, ConfigError> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        // Expiry is checked by `verify` against the caller's clock with no leeway,
        // so jsonwebtoken only has to authenticate and parse.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign a credential for `subject` valid for `ttl_seconds` from `now`.
    ///
    /// # Errors
    /// Returns an error if the ttl is not positive or signing fails.
    pub fn issue(&self, subject: &Subject, ttl_seconds: i64, now: i64) -> Result<String, IssueError> {
        if ttl_seconds <= 0 {
            return Err(IssueError::InvalidTtl(ttl_seconds));
        }

        let claims = CredentialClaims {
            subject_id: subject.id.clone(),
            email: subject.email.clone(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Check the signature, then the expiry, and return the decoded claims.
    ///
    /// # Errors
    /// Returns the first [`VerifyFailure`] encountered.
    pub fn verify(&self, token: &str, now: i64) -> Result<CredentialClaims, VerifyFailure> {
        let data = jsonwebtoken::decode::<CredentialClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyFailure::BadSignature
                }
                ErrorKind::ExpiredSignature => VerifyFailure::Expired,
                _ => VerifyFailure::Malformed,
            })?;

        if data.claims.exp <= now {
            return Err(VerifyFailure::Expired);
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("secret", &"***")
            .finish()
    }
}
