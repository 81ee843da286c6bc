//! Request snapshot and credential lookup.

use axum::http::{
    HeaderMap, Request,
    header::{AUTHORIZATION, COOKIE},
};
use std::collections::HashMap;

pub const CREDENTIAL_COOKIE_NAME: &str = "token";
const BEARER_PREFIX: &str = "Bearer ";

/// Read-only view of the request fields the gate looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub path: String,
    pub cookies: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl RequestContext {
    #[must_use]
    pub fn new(path: impl Into<String>, headers: HeaderMap) -> Self {
        let cookies = parse_cookies(&headers);
        Self {
            path: path.into(),
            cookies,
            headers,
        }
    }

    #[must_use]
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.uri().path(), request.headers().clone())
    }
}

/// Collect every `Cookie` header into a name/value map. The first occurrence of a
/// name wins.
fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            cookies
                .entry(key.trim().to_string())
                .or_insert_with(|| val.trim().to_string());
        }
    }
    cookies
}

/// Locates a candidate credential.
#[derive(Debug, Clone)]
pub struct CredentialLocator {
    cookie_name: String,
}

impl Default for CredentialLocator {
    fn default() -> Self {
        Self::new(CREDENTIAL_COOKIE_NAME)
    }
}

impl CredentialLocator {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    /// Return the first non-empty credential: the cookie, then a `Bearer` header.
    #[must_use]
    pub fn locate<'a>(&self, context: &'a RequestContext) -> Option<&'a str> {
        if let Some(token) = context
            .cookies
            .get(&self.cookie_name)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
        {
            return Some(token);
        }

        bearer_token(&context.headers)
    }
}

/// Everything after `Bearer `, untrimmed. The scheme is case-sensitive.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(cookie: Option<&'static str>, authorization: Option<&'static str>) -> RequestContext {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_static(cookie));
        }
        if let Some(authorization) = authorization {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(authorization));
        }
        RequestContext::new("/dashboard", headers)
    }

    #[test]
    fn nothing_present() {
        let locator = CredentialLocator::default();
        assert_eq!(locator.locate(&context(None, None)), None);
    }

    #[test]
    fn cookie_is_found_among_others() {
        let locator = CredentialLocator::default();
        let ctx = context(Some("theme=dark; token=abc.def.ghi; lang=en"), None);
        assert_eq!(locator.locate(&ctx), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_wins_over_header() {
        let locator = CredentialLocator::default();
        let ctx = context(Some("token=from-cookie"), Some("Bearer from-header"));
        assert_eq!(locator.locate(&ctx), Some("from-cookie"));
    }

    #[test]
    fn header_used_when_cookie_absent() {
        let locator = CredentialLocator::default();
        let ctx = context(Some("theme=dark"), Some("Bearer from-header"));
        assert_eq!(locator.locate(&ctx), Some("from-header"));
    }

    #[test]
    fn empty_cookie_falls_back_to_header() {
        let locator = CredentialLocator::default();
        let ctx = context(Some("token="), Some("Bearer from-header"));
        assert_eq!(locator.locate(&ctx), Some("from-header"));
    }

    #[test]
    fn bearer_scheme_is_case_sensitive() {
        let locator = CredentialLocator::default();
        assert_eq!(locator.locate(&context(None, Some("bearer abc"))), None);
        assert_eq!(locator.locate(&context(None, Some("BEARER abc"))), None);
        assert_eq!(locator.locate(&context(None, Some("Basic abc"))), None);
    }

    #[test]
    fn bearer_value_is_not_trimmed() {
        let locator = CredentialLocator::default();
        assert_eq!(
            locator.locate(&context(None, Some("Bearer  abc "))),
            Some(" abc ")
        );
        assert_eq!(locator.locate(&context(None, Some("Bearer "))), None);
    }

    #[test]
    fn custom_cookie_name() {
        let locator = CredentialLocator::new("session");
        let ctx = context(Some("token=ignored; session=xyz"), None);
        assert_eq!(locator.locate(&ctx), Some("xyz"));
    }

    #[test]
    fn context_from_request() -> anyhow::Result<()> {
        let request = Request::builder()
            .uri("/orders?page=2")
            .header(COOKIE, "token=t1")
            .body(())?;
        let ctx = RequestContext::from_request(&request);
        assert_eq!(ctx.path, "/orders");
        assert_eq!(ctx.cookies.get("token").map(String::as_str), Some("t1"));
        Ok(())
    }
}
