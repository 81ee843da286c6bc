use crate::{
    accounts::{InMemoryAccountStore, RegistrationService},
    api::{self, AppState},
    gate::Gate,
    token::{ConfigError, TokenCodec},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub static_dir: PathBuf,
    pub token_secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub cookie_name: String,
}

/// Build the shared state. Fails before anything is bound if the signing
/// secret is absent.
///
/// # Errors
/// Returns [`ConfigError`] (wrapped) for a missing secret or unusable cookie settings.
pub fn build_state(args: &Args) -> Result<AppState> {
    let secret = args
        .token_secret
        .as_ref()
        .ok_or(ConfigError::MissingSecret)
        .context("Set --token-secret or PORTIER_TOKEN_SECRET")?;

    let codec = Arc::new(TokenCodec::new(secret).context("Invalid token secret")?);
    let gate = Arc::new(Gate::new(codec.clone(), &args.cookie_name, args.secure_cookies)?);
    let registration = Arc::new(RegistrationService::new(
        Arc::new(InMemoryAccountStore::new()),
        codec.clone(),
        args.token_ttl_seconds,
    ));

    Ok(AppState {
        gate,
        codec,
        registration,
    })
}

/// Execute the server action.
/// # Errors
/// Returns an error if configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let state = build_state(&args)?;

    api::new(args.port, state, &args.static_dir).await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        static_dir = %args.static_dir.display(),
        token_ttl_seconds = args.token_ttl_seconds,
        secure_cookies = args.secure_cookies,
        cookie_name = %args.cookie_name,
        "Starting portier"
    );

    if !args.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist; non-API paths will return 404",
            args.static_dir.display()
        );
    }
}
