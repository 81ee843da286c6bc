//! Turns a [`Decision`] into what the server actually does with the request.

use super::decision::Decision;
use crate::token::ConfigError;
use axum::{
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use tracing::error;
use url::form_urlencoded;

const DEFAULT_SIGNIN_PATH: &str = "/signin";
const DEFAULT_HOME_PATH: &str = "/";
const DEFAULT_RETURN_PARAM: &str = "redirect";

pub enum Action {
    /// Hand the request to the next service untouched.
    Forward,
    /// Short-circuit with this response.
    Respond(Response),
}

#[derive(Debug, Clone)]
pub struct ActionExecutor {
    signin_path: String,
    home_path: String,
    return_param: String,
    clear_credential: HeaderValue,
}

impl ActionExecutor {
    /// # Errors
    /// Returns [`ConfigError::InvalidCookieName`] if `cookie_name` cannot be used in
    /// a `Set-Cookie` header.
    pub fn new(cookie_name: &str, secure: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            signin_path: DEFAULT_SIGNIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            return_param: DEFAULT_RETURN_PARAM.to_string(),
            clear_credential: clear_cookie(cookie_name, secure)?,
        })
    }

    pub fn execute(&self, decision: &Decision) -> Action {
        match decision {
            Decision::Allow | Decision::Passthrough => Action::Forward,
            Decision::RedirectToSignIn { return_path } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(&self.return_param, return_path)
                    .finish();
                Action::Respond(redirect(&format!("{}?{query}", self.signin_path), None))
            }
            Decision::RedirectToHome => Action::Respond(redirect(&self.home_path, None)),
            Decision::RedirectToSignInAndClearCredential => Action::Respond(redirect(
                &self.signin_path,
                Some(self.clear_credential.clone()),
            )),
        }
    }
}

/// Build a `307` redirect. The cookie deletion, if any, is part of the same
/// response so a client never sees one without the other.
fn redirect(location: &str, set_cookie: Option<HeaderValue>) -> Response {
    let location = match HeaderValue::from_str(location) {
        Ok(location) => location,
        Err(err) => {
            error!("Invalid redirect location {location:?}: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);
    if let Some(cookie) = set_cookie {
        headers.insert(SET_COOKIE, cookie);
    }

    (StatusCode::TEMPORARY_REDIRECT, headers).into_response()
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, ConfigError> {
    let valid_name = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !valid_name {
        return Err(ConfigError::InvalidCookieName(name.to_string()));
    }

    let mut cookie =
        format!("{name}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|_| ConfigError::InvalidCookieName(name.to_string()))
}
