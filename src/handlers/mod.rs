//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the ledger store.

mod account_handler;
mod commands;
mod payment_handler;
mod query_handler;
mod transaction_handler;


pub use account_handler::AccountHandler;
pub use commands::*;
pub use payment_handler::PaymentMethodHandler;
pub use query_handler::UserQueryHandler;
pub use transaction_handler::RecordTransactionHandler;

use crate::auth::AuthError;
use crate::domain::OperationContext;

/// A token may only act on its own user.
///
/// Contexts without a request user (internal callers) are not restricted.
pub(crate) fn authorize(context: &OperationContext, user_id: &str) -> Result<(), AuthError> {
    match context.request_user_id.as_deref() {
        Some(request_user_id) if request_user_id != user_id => Err(AuthError::Forbidden),
        _ => Ok(()),
    }
}
