use crate::gate::CREDENTIAL_COOKIE_NAME;
use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";
pub const ARG_COOKIE_NAME: &str = "cookie-name";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Shared secret used to sign and verify credentials")
                .env("PORTIER_TOKEN_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Lifetime of credentials issued at signup, in seconds")
                .env("PORTIER_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Mark the credential-clearing cookie as Secure")
                .env("PORTIER_SECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_COOKIE_NAME)
                .long(ARG_COOKIE_NAME)
                .help("Name of the cookie carrying the credential")
                .env("PORTIER_COOKIE_NAME")
                .default_value(CREDENTIAL_COOKIE_NAME),
        )
}

#[derive(Debug)]
pub struct Options {
    /// `None` when neither the flag nor the environment provides it.
    pub token_secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub cookie_name: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .map(|secret| SecretString::from(secret.clone()));
        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_TOKEN_TTL_SECONDS}"))?;
        let cookie_name = matches
            .get_one::<String>(ARG_COOKIE_NAME)
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_COOKIE_NAME}"))?;

        Ok(Self {
            token_secret,
            token_ttl_seconds,
            secure_cookies: matches.get_flag(ARG_SECURE_COOKIES),
            cookie_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::DEFAULT_TOKEN_TTL_SECONDS;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults() -> Result<()> {
        temp_env::with_vars(
            [
                ("PORTIER_TOKEN_SECRET", None::<&str>),
                ("PORTIER_TOKEN_TTL_SECONDS", None),
                ("PORTIER_SECURE_COOKIES", None),
                ("PORTIER_COOKIE_NAME", None),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(vec!["test"]);
                let options = Options::parse(&matches)?;
                assert!(options.token_secret.is_none());
                assert_eq!(options.token_ttl_seconds, DEFAULT_TOKEN_TTL_SECONDS);
                assert!(!options.secure_cookies);
                assert_eq!(options.cookie_name, "token");
                Ok(())
            },
        )
    }

    #[test]
    fn from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("PORTIER_TOKEN_SECRET", Some("s3cret")),
                ("PORTIER_TOKEN_TTL_SECONDS", Some("60")),
                ("PORTIER_SECURE_COOKIES", Some("true")),
                ("PORTIER_COOKIE_NAME", Some("session")),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(vec!["test"]);
                let options = Options::parse(&matches)?;
                assert_eq!(
                    options.token_secret.as_ref().map(|s| s.expose_secret().to_string()),
                    Some("s3cret".to_string())
                );
                assert_eq!(options.token_ttl_seconds, 60);
                assert!(options.secure_cookies);
                assert_eq!(options.cookie_name, "session");
                Ok(())
            },
        )
    }

    #[test]
    fn rejects_non_positive_ttl() {
        temp_env::with_var_unset("PORTIER_TOKEN_TTL_SECONDS", || {
            let result = with_args(Command::new("test")).try_get_matches_from(vec![
                "test",
                "--token-ttl-seconds",
                "0",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn debug_hides_secret() -> Result<()> {
        let matches = with_args(Command::new("test")).get_matches_from(vec![
            "test",
            "--token-secret",
            "s3cret",
        ]);
        let options = Options::parse(&matches)?;
        assert!(!format!("{options:?}").contains("s3cret"));
        Ok(())
    }
}
