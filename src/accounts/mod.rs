//! Account registration.
//!
//! The gate never touches this module; it only issues the credential the gate
//! later verifies. Persistence sits behind [`AccountStore`].

use crate::token::{IssueError, Subject, TokenCodec, unix_now};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use rand::rngs::OsRng;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use thiserror::Error;
use tracing::{debug, error, info_span};
use uuid::Uuid;

pub const MISSING_FIELDS_MESSAGE: &str = "Email and password are required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("account already exists")]
    Conflict,
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for accounts, keyed by the email exactly as submitted.
pub trait AccountStore: Send + Sync {
    /// Insert `account` unless one with the same email exists. Check and insert
    /// are a single step.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] if the email is taken.
    fn insert(&self, account: Account) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the store cannot be read.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        if accounts.contains_key(&account.email) {
            return Err(StoreError::Conflict);
        }
        accounts.insert(account.email.clone(), account);
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(accounts.get(email).cloned())
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),
    #[error("Account already exists")]
    Conflict,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Issue(#[from] IssueError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

/// Argon2id hash in PHC string format.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, RegistrationError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| RegistrationError::Hash(err.to_string()))
}

pub struct RegistrationService {
    store: Arc<dyn AccountStore>,
    codec: Arc<TokenCodec>,
    token_ttl_seconds: i64,
}

impl RegistrationService {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, codec: Arc<TokenCodec>, token_ttl_seconds: i64) -> Self {
        Self {
            store,
            codec,
            token_ttl_seconds,
        }
    }

    /// Create the account and return a freshly issued credential for it.
    ///
    /// The email is stored, compared and signed exactly as submitted; any
    /// non-empty pair is accepted.
    ///
    /// # Errors
    /// [`RegistrationError::Validation`] if either field is empty,
    /// [`RegistrationError::Conflict`] if the email is taken, anything else is
    /// internal.
    pub fn register(&self, email: &str, password: &str) -> Result<String, RegistrationError> {
        if email.is_empty() || password.is_empty() {
            return Err(RegistrationError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        // cheap pre-check so a taken email does not pay for hashing
        if self.store.find_by_email(email)?.is_some() {
            debug!("Account already exists");
            return Err(RegistrationError::Conflict);
        }

        let password_hash = {
            let _span = info_span!("password.hash", algorithm = "argon2id").entered();
            hash_password(password)?
        };

        let account = Account {
            id: Uuid::now_v7().to_string(),
            email: email.to_string(),
            password_hash,
        };
        let subject = Subject {
            id: account.id.clone(),
            email: account.email.clone(),
        };

        self.store.insert(account)?;

        self.codec
            .issue(&subject, self.token_ttl_seconds, unix_now())
            .map_err(|err| {
                error!("Failed to issue credential: {err}");
                err.into()
            })
    }
}
