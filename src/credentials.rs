//! One-way password digests backed by bcrypt.
//!
//! bcrypt is CPU bound, so both operations run on the blocking pool.

use crate::error::AppError;

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Credential(e.to_string()))?
        .map_err(|e| AppError::Credential(e.to_string()))
}

// A digest that fails to parse counts as a mismatch, not a server fault
pub async fn verify_password(password: String, digest: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest))
        .await
        .map_err(|e| AppError::Credential(e.to_string()))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("⚠️ Stored password digest is unreadable: {}", e);
            Ok(false)
        }
    }
}
