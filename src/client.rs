//! Front-end credential helpers.
//!
//! These run in the client application (e.g. a wasm front end) to decide what
//! to attach to outgoing requests. They are independent of the server gate and
//! do not verify signatures: `is_valid_token_format` is a shape and expiry
//! check only.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::gate::CREDENTIAL_COOKIE_NAME;

/// Persistent key/value storage available to the client (browser `localStorage`).
pub trait LocalStore {
    fn get_item(&self, key: &str) -> Option<String>;
}

impl LocalStore for std::collections::HashMap<String, String> {
    fn get_item(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// The client's view of the credential carriers.
pub struct ClientCredentials<'a, S: LocalStore + ?Sized> {
    store: &'a S,
    cookie_string: &'a str,
}

impl<'a, S: LocalStore + ?Sized> ClientCredentials<'a, S> {
    /// `cookie_string` is the raw `document.cookie` value.
    pub fn new(store: &'a S, cookie_string: &'a str) -> Self {
        Self {
            store,
            cookie_string,
        }
    }

    /// Local store first, then the cookie string.
    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        if let Some(token) = self
            .store
            .get_item(CREDENTIAL_COOKIE_NAME)
            .filter(|token| !token.is_empty())
        {
            return Some(token);
        }

        cookie_value(self.cookie_string, CREDENTIAL_COOKIE_NAME)
    }

    #[must_use]
    pub fn is_authenticated(&self, now: i64) -> bool {
        self.get_token()
            .is_some_and(|token| is_valid_token_format(&token, now))
    }
}

fn cookie_value(cookie_string: &str, name: &str) -> Option<String> {
    cookie_string.split(';').find_map(|pair| {
        let value = pair.trim().strip_prefix(name)?.strip_prefix('=')?;
        // value ends at the next '='
        value.split('=').next().map(ToString::to_string)
    })
}

#[derive(Deserialize)]
struct ExpiryOnly {
    exp: Option<f64>,
}

/// Three dot-separated segments, a JSON object in the middle one, and an `exp`
/// that is not in the past. Any decode failure yields `false`.
///
/// Stricter than a browser `atob` check: the payload must be canonical unpadded
/// base64url (non-zero trailing bits are rejected), and `exp: 0` is an expiry
/// in 1970, not a missing one.
#[must_use]
pub fn is_valid_token_format(token: &str, now: i64) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return false;
    };

    let Ok(bytes) = Base64UrlUnpadded::decode_vec(payload.trim_end_matches('=')) else {
        return false;
    };
    let Ok(claims) = serde_json::from_slice::<ExpiryOnly>(&bytes) else {
        return false;
    };

    #[allow(clippy::cast_precision_loss)]
    let now = now as f64;
    !claims.exp.is_some_and(|exp| exp < now)
}

/// Default lifetime of the cookie written after sign-up.
pub const DEFAULT_COOKIE_DAYS: i64 = 7;

/// Cookie string written by the client after sign-up: `name=value;expires=…;path=/`.
#[must_use]
pub fn set_token_cookie(name: &str, value: &str, days: i64) -> String {
    let expires = Utc::now() + Duration::days(days);
    format!(
        "{name}={value};expires={};path=/",
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}
