//! Store Error Types

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Unique constraint violation
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// A stored row does not satisfy the domain invariants
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                let constraint = db_error
                    .constraint()
                    .unwrap_or("unique constraint")
                    .to_string();
                return Self::Duplicate(constraint);
            }
        }
        Self::Database(error)
    }
}
