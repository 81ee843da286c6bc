use thiserror::Error;

/// Startup configuration failures. These are fatal: the server must not start
/// with authentication silently disabled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing token signing secret")]
    MissingSecret,
    #[error("invalid credential cookie name: {0}")]
    InvalidCookieName(String),
}

/// Why a presented credential was rejected.
///
/// Only used for logging; the gate treats every variant as "invalid".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl VerifyFailure {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("invalid token ttl: {0}")]
    InvalidTtl(i64),
    #[error("failed to sign token")]
    Sign(#[from] jsonwebtoken::errors::Error),
}
