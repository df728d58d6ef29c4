//! bcrypt password hashing
//!
//! bcrypt is CPU bound; both calls run on the blocking pool.

use super::AuthError;

pub(super) async fn hash(secret: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub(super) async fn verify(secret: String, hash: String) -> bool {
    match tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash)).await {
        Ok(Ok(valid)) => valid,
        Ok(Err(e)) => {
            tracing::debug!("Password hash could not be checked: {}", e);
            false
        }
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}
