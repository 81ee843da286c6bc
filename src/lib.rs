//! # Portier (request gate and credential issuer)
//!
//! `portier` sits in front of a web application and decides, per request,
//! whether to let it through, send the visitor to sign in, or bounce an already
//! signed-in visitor away from the sign-in pages.
//!
//! ## Gate
//!
//! Paths are classified before any credential is looked at. Static assets and
//! open API endpoints never pay for token verification. Page routes read the
//! `token` cookie (or an `Authorization: Bearer` header) and verify it as an
//! HS256 JWT. Invalid credentials are never an error: they become a redirect to
//! `/signin` that also deletes the cookie.
//!
//! ## Credentials
//!
//! `POST /api/signup` creates an account (argon2id password hash) and returns a
//! one-hour credential. Handlers under `/api/protected/` authenticate the bearer
//! header themselves via [`api::handlers::Authenticated`].
//!
//! ## Client helpers
//!
//! [`client`] holds the front-end side: where the credential is read from and a
//! cheap shape/expiry pre-check.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod client;
pub mod gate;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
