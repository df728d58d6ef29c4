//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod context;
pub mod error;
pub mod payment;
pub mod transaction;
pub mod user;

pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::DomainError;
pub use payment::{NewUserPaymentMethod, PaymentMethod, UserPaymentMethod};
pub use transaction::{BalanceEffect, NewTransaction, TransactionRecord, TransactionStatus};
pub use user::{is_valid_email, LoginType, NewUser, User, UserProfile};
