use thiserror::Error;

use crate::store::StoreError;

/// Failures surfaced by the account and listing services.
///
/// Per-recipient mail failures are deliberately absent: they live in
/// [`crate::notify::NotificationError`] and never reach a caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("an account with this email already exists")]
    DuplicateAccount,
    #[error("no account with this email")]
    AccountNotFound,
    #[error("incorrect password")]
    InvalidCredentials,
    #[error("waste listing not found")]
    NotFound,
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("persistence error: {0}")]
    Persistence(#[source] StoreError),
    #[error("credential hashing failed: {0}")]
    Credential(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
