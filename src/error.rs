//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::DomainError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// HTTP status and stable machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Domain(err) => match err {
                // 400 Bad Request
                DomainError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
                DomainError::InvalidValue(_) => (StatusCode::BAD_REQUEST, "INVALID_VALUE"),
                DomainError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
                DomainError::InsufficientBalance { .. } => {
                    (StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE")
                }
                // 404 Not Found
                DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
                // 409 Conflict
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_PRESENT"),
                DomainError::UserAlreadyExists => (StatusCode::CONFLICT, "USER_ALREADY_EXISTS"),
            },

            AppError::Auth(err) => match err {
                // 401 Unauthorized
                AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_MISSING"),
                AuthError::InvalidPassword => (StatusCode::UNAUTHORIZED, "INVALID_PASSWORD"),
                // 403 Forbidden
                AuthError::InvalidToken => (StatusCode::FORBIDDEN, "INVALID_TOKEN"),
                AuthError::TokenExpired => (StatusCode::FORBIDDEN, "TOKEN_EXPIRED"),
                AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                // 500
                AuthError::TokenGeneration(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_GENERATION_FAILED")
                }
                AuthError::Hashing(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "PASSWORD_ENCRYPTION_FAILED")
                }
            },

            AppError::Store(StoreError::Duplicate(_)) => (StatusCode::CONFLICT, "ALREADY_PRESENT"),

            // 500 Internal Server Error
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
        }
    }

    /// Message safe to show to clients
    fn public_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::UserNotFound(_)) => "User not found".to_string(),
            AppError::Domain(DomainError::InsufficientBalance { .. }) => {
                "Insufficient balance".to_string()
            }
            AppError::Domain(err) => err.to_string(),
            AppError::Auth(AuthError::TokenGeneration(_)) => {
                "Error while generating token".to_string()
            }
            AppError::Auth(AuthError::Hashing(_)) => "Error while encrypting password".to_string(),
            AppError::Auth(err) => err.to_string(),
            AppError::Store(StoreError::Duplicate(_)) => "Resource already exists".to_string(),
            AppError::Store(_) => "Internal server error".to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error_code, "Request failed: {:?}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.public_message(),
            error_code: error_code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let cases = [
            (
                DomainError::MissingField("x".to_string()),
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
            ),
            (
                DomainError::InvalidValue("x".to_string()),
                StatusCode::BAD_REQUEST,
                "INVALID_VALUE",
            ),
            (
                DomainError::UserNotFound("ghost".to_string()),
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
            ),
            (
                DomainError::insufficient_balance(100, 60),
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_BALANCE",
            ),
            (
                DomainError::AlreadyExists("x".to_string()),
                StatusCode::CONFLICT,
                "ALREADY_PRESENT",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(AppError::from(err).status_and_code(), (status, code));
        }
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            AppError::from(AuthError::MissingToken).status_and_code(),
            (StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_MISSING")
        );
        assert_eq!(
            AppError::from(AuthError::TokenExpired).status_and_code(),
            (StatusCode::FORBIDDEN, "TOKEN_EXPIRED")
        );
    }

    #[test]
    fn test_store_error_is_opaque() {
        let err = AppError::from(StoreError::InvalidRow("users.balance = -5".to_string()));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR")
        );
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse {
            success: false,
            error: "User not found".to_string(),
            error_code: "USER_NOT_FOUND".to_string(),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "USER_NOT_FOUND");
    }
}
