//! Identity Error Types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required. Please sign in.")]
    MissingToken,

    #[error("Invalid token. Please log in again.")]
    InvalidToken,

    #[error("Session expired. Please log in to continue.")]
    TokenExpired,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Token does not grant access to this user")]
    Forbidden,

    #[error("Error while generating token: {0}")]
    TokenGeneration(String),

    #[error("Error while encrypting password: {0}")]
    Hashing(String),
}
