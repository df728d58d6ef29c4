//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent validation failures and business rule violations.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required request field is absent or empty
    #[error("{0}")]
    MissingField(String),

    /// A field is present but not acceptable (bad enum member, bad number)
    #[error("{0}")]
    InvalidValue(String),

    /// Email address does not look like an email address
    #[error("Invalid email address format")]
    InvalidEmail,

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Subtraction would take the balance below zero
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    /// Duplicate transaction id or payment method
    #[error("{0}")]
    AlreadyExists(String),

    /// Email address or phone number already registered
    #[error("Email address or phone number already registered")]
    UserAlreadyExists,
}

impl DomainError {
    /// Create an insufficient balance error
    pub fn insufficient_balance(required: i64, available: i64) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }
}
