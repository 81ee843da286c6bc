//! Authorization decision table.

use super::route::RouteCategory;
use crate::token::{CredentialClaims, VerifyFailure};

/// Result of looking up and verifying the request credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Missing,
    Valid(CredentialClaims),
    Invalid(VerifyFailure),
}

/// Terminal outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Checked and allowed.
    Allow,
    /// Not gated here; authorization belongs to the downstream handler.
    Passthrough,
    RedirectToSignIn { return_path: String },
    RedirectToHome,
    RedirectToSignInAndClearCredential,
}

impl Decision {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Passthrough => "passthrough",
            Self::RedirectToSignIn { .. } => "redirect_to_signin",
            Self::RedirectToHome => "redirect_to_home",
            Self::RedirectToSignInAndClearCredential => "redirect_to_signin_clear_credential",
        }
    }
}

/// Map a category and credential to a decision.
///
/// `credential` is only called for categories that need it, so ungated
/// categories never touch the request credential.
pub fn decide<F>(category: RouteCategory, path: &str, credential: F) -> Decision
where
    F: FnOnce() -> CredentialState,
{
    match category {
        RouteCategory::PublicAsset | RouteCategory::OpenApi => Decision::Allow,
        RouteCategory::ProtectedApi => Decision::Passthrough,
        RouteCategory::PublicRoute => match credential() {
            CredentialState::Valid(_) => Decision::RedirectToHome,
            // a stale cookie on a public page is left alone
            CredentialState::Missing | CredentialState::Invalid(_) => Decision::Allow,
        },
        RouteCategory::ProtectedRoute | RouteCategory::Root => match credential() {
            CredentialState::Valid(_) => Decision::Allow,
            CredentialState::Missing => Decision::RedirectToSignIn {
                return_path: path.to_string(),
            },
            CredentialState::Invalid(_) => Decision::RedirectToSignInAndClearCredential,
        },
    }
}
