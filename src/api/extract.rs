//! Request extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::domain::DomainError;
use crate::error::AppError;

/// `axum::Json` whose rejections use the error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Domain(DomainError::InvalidValue(rejection.body_text()))
    }
}

/// Authenticated user resolved from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}
