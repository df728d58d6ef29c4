//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Router,
};

use crate::domain::{OperationContext, PaymentMethod, TransactionRecord, UserPaymentMethod, UserProfile};
use crate::error::AppError;
use crate::handlers::{
    AccountCommand, AccountHandler, AddPaymentMethodCommand, AuthResult, Listing,
    PaymentMethodHandler, RecordTransactionCommand, RecordTransactionHandler, TransactionReceipt,
    UserQueryHandler,
};

use super::extract::{ApiJson, AuthenticatedUser};
use super::{ApiResponse, AppState};

// =========================================================================
// API Routers
// =========================================================================

/// Routes reachable without a token
pub fn create_public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes behind bearer authentication
pub fn create_protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        // Users
        .route("/users/:user_id/details", get(get_user_details))
        .route("/users/:user_id/transactions", get(get_user_transactions))
        .route("/users/transactions", post(record_transaction))
        // Payment methods
        .route("/payment-methods", get(list_payment_methods))
        .route("/payment/:user_id", get(list_user_payment_methods))
        .route("/payment", post(add_user_payment_method))
}

// =========================================================================
// POST /auth/register, /auth/login, /auth/logout
// =========================================================================

async fn register(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(command): ApiJson<AccountCommand>,
) -> Result<ApiResponse<AuthResult>, AppError> {
    let handler = AccountHandler::new(state.store, state.identity);
    let result = handler.register(command, &context).await?;
    Ok(ApiResponse::with_message("User registered successfully", result))
}

async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(command): ApiJson<AccountCommand>,
) -> Result<ApiResponse<AuthResult>, AppError> {
    let handler = AccountHandler::new(state.store, state.identity);
    let result = handler.login(command, &context).await?;
    Ok(ApiResponse::with_message("User logged in successfully", result))
}

async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiResponse<()>, AppError> {
    let handler = AccountHandler::new(state.store, state.identity);
    handler.logout(&user.user_id, &context).await?;
    Ok(ApiResponse::message("User logged out successfully"))
}

// =========================================================================
// Users
// =========================================================================

async fn get_user_details(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let profile = UserQueryHandler::new(state.store)
        .details(&user_id, &context)
        .await?;
    Ok(ApiResponse::ok(profile))
}

async fn get_user_transactions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Listing<TransactionRecord>>, AppError> {
    let listing = UserQueryHandler::new(state.store)
        .transactions(&user_id, &context)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Record a transaction and apply it to the user's balance
async fn record_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(command): ApiJson<RecordTransactionCommand>,
) -> Result<ApiResponse<TransactionReceipt>, AppError> {
    let receipt = RecordTransactionHandler::new(state.store)
        .execute(command, &context)
        .await?;
    Ok(ApiResponse::with_message("Transaction recorded successfully", receipt))
}

// =========================================================================
// Payment methods
// =========================================================================

async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<ApiResponse<Listing<PaymentMethod>>, AppError> {
    let listing = PaymentMethodHandler::new(state.store).catalog().await?;
    Ok(ApiResponse::ok(listing))
}

async fn list_user_payment_methods(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Listing<UserPaymentMethod>>, AppError> {
    let listing = PaymentMethodHandler::new(state.store)
        .list_for_user(&user_id, &context)
        .await?;
    Ok(ApiResponse::ok(listing))
}

async fn add_user_payment_method(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    ApiJson(command): ApiJson<AddPaymentMethodCommand>,
) -> Result<ApiResponse<UserPaymentMethod>, AppError> {
    let added = PaymentMethodHandler::new(state.store)
        .add(command, &context)
        .await?;
    Ok(ApiResponse::with_message("Payment method added successfully", added))
}
