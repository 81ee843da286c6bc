//! Request gate.
//!
//! Every request matched by [`Matcher`] is first classified by path
//! ([`RouteRules`]). Only then, and only for categories that need it, is the
//! credential located ([`CredentialLocator`]) and verified ([`TokenCodec`]).
//! [`decide`] maps the two into a [`Decision`] and [`ActionExecutor`] turns that
//! into either "forward" or a redirect response.
//!
//! The gate holds no per-request state and never fails: verification errors
//! become redirects, not `401`/`500` responses.
//!
//! | Category | No credential | Valid | Invalid |
//! |---|---|---|---|
//! | `PublicAsset` / `OpenApi` | allow | allow | allow |
//! | `PublicRoute` | allow | redirect `/` | allow |
//! | `ProtectedRoute` / `Root` | redirect `/signin?redirect=…` | allow | redirect `/signin` + clear cookie |
//! | `ProtectedApi` | passthrough | passthrough | passthrough |

mod action;
mod credential;
mod decision;
mod matcher;
mod middleware;
mod route;

pub use action::{Action, ActionExecutor};
pub use credential::{CREDENTIAL_COOKIE_NAME, CredentialLocator, RequestContext, bearer_token};
pub use decision::{CredentialState, Decision, decide};
pub use matcher::{EXCLUDED_PREFIXES, Matcher};
pub use middleware::gate;
pub use route::{RouteCategory, RouteRules};

use crate::token::{ConfigError, TokenCodec};
use std::sync::Arc;

/// What the gate concluded for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub category: RouteCategory,
    /// `None` when the category is not gated and the credential was never looked at.
    pub credential: Option<CredentialState>,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
pub struct Gate {
    matcher: Matcher,
    rules: RouteRules,
    locator: CredentialLocator,
    codec: Arc<TokenCodec>,
    executor: ActionExecutor,
}

impl Gate {
    /// Gate with the default rules, reading the credential from `cookie_name`
    /// ([`CREDENTIAL_COOKIE_NAME`] unless configured otherwise).
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCookieName`] if `cookie_name` is unusable.
    pub fn new(
        codec: Arc<TokenCodec>,
        cookie_name: &str,
        secure_cookies: bool,
    ) -> Result<Self, ConfigError> {
        Self::with_rules(codec, RouteRules::default(), cookie_name, secure_cookies)
    }

    fn with_rules(
        codec: Arc<TokenCodec>,
        rules: RouteRules,
        cookie_name: &str,
        secure_cookies: bool,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            matcher: Matcher::default(),
            rules,
            locator: CredentialLocator::new(cookie_name),
            codec,
            executor: ActionExecutor::new(cookie_name, secure_cookies)?,
        })
    }

    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[must_use]
    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// Classify, then (if needed) verify, then decide.
    #[must_use]
    pub fn evaluate(&self, context: &RequestContext, now: i64) -> Evaluation {
        let category = self.rules.classify(&context.path);
        let mut inspected = None;

        let decision = decide(category, &context.path, || {
            let state = match self.locator.locate(context) {
                None => CredentialState::Missing,
                Some(token) => match self.codec.verify(token, now) {
                    Ok(claims) => CredentialState::Valid(claims),
                    Err(failure) => CredentialState::Invalid(failure),
                },
            };
            inspected = Some(state.clone());
            state
        });

        Evaluation {
            category,
            credential: inspected,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Subject, VerifyFailure};
    use axum::http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE},
    };
    use secrecy::SecretString;

    const NOW: i64 = 1_700_000_000;

    fn codec(secret: &str) -> anyhow::Result<Arc<TokenCodec>> {
        Ok(Arc::new(TokenCodec::new(&SecretString::from(secret.to_string()))?))
    }

    fn gate() -> anyhow::Result<Gate> {
        Ok(Gate::new(codec("s3cret")?, CREDENTIAL_COOKIE_NAME, false)?)
    }

    fn token(secret: &str, ttl: i64, now: i64) -> anyhow::Result<String> {
        let subject = Subject {
            id: "7".to_string(),
            email: "owner@restaurant.test".to_string(),
        };
        Ok(codec(secret)?.issue(&subject, ttl, now)?)
    }

    fn request(path: &str, cookie: Option<&str>, bearer: Option<&str>) -> anyhow::Result<RequestContext> {
        let mut headers = HeaderMap::new();
        if let Some(token) = cookie {
            headers.insert(COOKIE, HeaderValue::from_str(&format!("token={token}"))?);
        }
        if let Some(token) = bearer {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        Ok(RequestContext::new(path, headers))
    }

    #[test]
    fn scenario_dashboard_without_credential() -> anyhow::Result<()> {
        let evaluation = gate()?.evaluate(&request("/dashboard", None, None)?, NOW);
        assert_eq!(evaluation.category, RouteCategory::ProtectedRoute);
        assert_eq!(evaluation.credential, Some(CredentialState::Missing));
        assert_eq!(
            evaluation.decision,
            Decision::RedirectToSignIn {
                return_path: "/dashboard".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn scenario_signin_with_valid_credential() -> anyhow::Result<()> {
        let valid = token("s3cret", 3600, NOW)?;
        let evaluation = gate()?.evaluate(&request("/signin", Some(&valid), None)?, NOW);
        assert_eq!(evaluation.decision, Decision::RedirectToHome);
        Ok(())
    }

    #[test]
    fn scenario_restaurant_api_without_credential() -> anyhow::Result<()> {
        let evaluation = gate()?.evaluate(&request("/api/restaurant", None, None)?, NOW);
        assert_eq!(
            evaluation.decision,
            Decision::RedirectToSignIn {
                return_path: "/api/restaurant".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn scenario_image_allowed_in_any_state() -> anyhow::Result<()> {
        let gate = gate()?;
        let valid = token("s3cret", 3600, NOW)?;
        let forged = token("other", 3600, NOW)?;
        for cookie in [None, Some(valid.as_str()), Some(forged.as_str()), Some("junk")] {
            let evaluation = gate.evaluate(&request("/menu.png", cookie, None)?, NOW);
            assert_eq!(evaluation.category, RouteCategory::PublicAsset);
            assert_eq!(evaluation.decision, Decision::Allow);
            assert_eq!(evaluation.credential, None);
        }
        Ok(())
    }

    #[test]
    fn valid_credential_on_protected_route_allows() -> anyhow::Result<()> {
        let valid = token("s3cret", 3600, NOW)?;
        let gate = gate()?;
        for path in ["/dashboard", "/orders", "/", "/anything"] {
            let evaluation = gate.evaluate(&request(path, Some(&valid), None)?, NOW);
            assert_eq!(evaluation.decision, Decision::Allow, "{path}");
        }
        Ok(())
    }

    #[test]
    fn bearer_header_is_accepted() -> anyhow::Result<()> {
        let valid = token("s3cret", 3600, NOW)?;
        let evaluation = gate()?.evaluate(&request("/dashboard", None, Some(&valid))?, NOW);
        assert_eq!(evaluation.decision, Decision::Allow);
        Ok(())
    }

    #[test]
    fn expired_credential_clears() -> anyhow::Result<()> {
        let expired = token("s3cret", 60, NOW - 61)?;
        let evaluation = gate()?.evaluate(&request("/dashboard", Some(&expired), None)?, NOW);
        assert_eq!(
            evaluation.credential,
            Some(CredentialState::Invalid(VerifyFailure::Expired))
        );
        assert_eq!(evaluation.decision, Decision::RedirectToSignInAndClearCredential);
        Ok(())
    }

    #[test]
    fn forged_credential_clears() -> anyhow::Result<()> {
        let forged = token("other", 3600, NOW)?;
        let evaluation = gate()?.evaluate(&request("/", Some(&forged), None)?, NOW);
        assert_eq!(
            evaluation.credential,
            Some(CredentialState::Invalid(VerifyFailure::BadSignature))
        );
        assert_eq!(evaluation.decision, Decision::RedirectToSignInAndClearCredential);
        Ok(())
    }

    #[test]
    fn cookie_token_is_evaluated_over_header() -> anyhow::Result<()> {
        let valid = token("s3cret", 3600, NOW)?;
        let forged = token("other", 3600, NOW)?;
        let gate = gate()?;

        let evaluation = gate.evaluate(&request("/dashboard", Some(&forged), Some(&valid))?, NOW);
        assert_eq!(evaluation.decision, Decision::RedirectToSignInAndClearCredential);

        let evaluation = gate.evaluate(&request("/dashboard", Some(&valid), Some(&forged))?, NOW);
        assert_eq!(evaluation.decision, Decision::Allow);
        Ok(())
    }

    #[test]
    fn stale_cookie_on_public_page_is_left_alone() -> anyhow::Result<()> {
        let expired = token("s3cret", 60, NOW - 600)?;
        let evaluation = gate()?.evaluate(&request("/signup", Some(&expired), None)?, NOW);
        assert_eq!(evaluation.decision, Decision::Allow);
        Ok(())
    }

    #[test]
    fn protected_api_never_inspects_credential() -> anyhow::Result<()> {
        let forged = token("other", 3600, NOW)?;
        let evaluation = gate()?.evaluate(&request("/api/protected/session", Some(&forged), None)?, NOW);
        assert_eq!(evaluation.category, RouteCategory::ProtectedApi);
        assert_eq!(evaluation.credential, None);
        assert_eq!(evaluation.decision, Decision::Passthrough);
        Ok(())
    }

    #[test]
    fn unusable_cookie_name_is_a_config_error() -> anyhow::Result<()> {
        assert!(matches!(
            Gate::new(codec("s3cret")?, "to ken", false),
            Err(ConfigError::InvalidCookieName(_))
        ));
        Ok(())
    }

    #[test]
    fn configured_cookie_name() -> anyhow::Result<()> {
        let gate = Gate::new(codec("s3cret")?, "session", false)?;
        let valid = token("s3cret", 3600, NOW)?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("session={valid}"))?);
        let evaluation = gate.evaluate(&RequestContext::new("/dashboard", headers), NOW);
        assert!(matches!(evaluation.credential, Some(CredentialState::Valid(_))));
        assert_eq!(evaluation.decision, Decision::Allow);
        Ok(())
    }

    #[test]
    fn custom_rules_and_cookie_name() -> anyhow::Result<()> {
        let rules = RouteRules::new().with_public_routes(["/login"]);
        let gate = Gate::with_rules(codec("s3cret")?, rules, "session", false)?;
        let valid = token("s3cret", 3600, NOW)?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("session={valid}"))?);
        let evaluation = gate.evaluate(&RequestContext::new("/login", headers), NOW);
        assert_eq!(evaluation.category, RouteCategory::PublicRoute);
        assert_eq!(evaluation.decision, Decision::RedirectToHome);

        // the default cookie name is no longer read
        let evaluation = gate.evaluate(&request("/dashboard", Some(&valid), None)?, NOW);
        assert_eq!(evaluation.credential, Some(CredentialState::Missing));
        Ok(())
    }
}
