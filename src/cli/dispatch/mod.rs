//! Map validated CLI arguments to an action.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, ARG_STATIC_DIR, auth};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let static_dir = matches
        .get_one::<String>(ARG_STATIC_DIR)
        .map(PathBuf::from)
        .context("missing required argument: --static-dir")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        static_dir,
        token_secret: auth_opts.token_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        secure_cookies: auth_opts.secure_cookies,
        cookie_name: auth_opts.cookie_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_args_from_env() {
        temp_env::with_vars(
            [
                ("PORTIER_PORT", Some("9090")),
                ("PORTIER_STATIC_DIR", Some("/srv/portier")),
                ("PORTIER_TOKEN_SECRET", Some("s3cret")),
                ("PORTIER_TOKEN_TTL_SECONDS", Some("120")),
                ("PORTIER_SECURE_COOKIES", None),
                ("PORTIER_COOKIE_NAME", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["portier"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 9090);
                    assert_eq!(args.static_dir, PathBuf::from("/srv/portier"));
                    assert_eq!(
                        args.token_secret.as_ref().map(|s| s.expose_secret().to_string()),
                        Some("s3cret".to_string())
                    );
                    assert_eq!(args.token_ttl_seconds, 120);
                    assert!(!args.secure_cookies);
                    assert_eq!(args.cookie_name, "token");
                }
            },
        );
    }

    #[test]
    fn missing_secret_is_deferred_to_start() {
        temp_env::with_vars([("PORTIER_TOKEN_SECRET", None::<&str>)], || {
            let matches = crate::cli::commands::new().get_matches_from(vec!["portier"]);
            let result = handler(&matches);
            assert!(matches!(
                result,
                Ok(Action::Server(Args {
                    token_secret: None,
                    ..
                }))
            ));
        });
    }
}
