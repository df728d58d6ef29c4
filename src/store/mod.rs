//! Store module
//!
//! Persistence port for users, the transaction log and payment methods,
//! with a PostgreSQL adapter and an in-process adapter.
//!
//! Balance mutations only happen through a [`UnitOfWork`]. A unit holds the
//! user's row lock from [`UnitOfWork::lock_balance`] until it is committed or
//! dropped; dropping an uncommitted unit discards every write made through it.

mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Balance, NewTransaction, NewUser, NewUserPaymentMethod, PaymentMethod, TransactionRecord,
    User, UserPaymentMethod,
};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Atomic unit of work over the ledger tables.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Lock the user's row and read its balance.
    ///
    /// Returns `None` if the user does not exist.
    async fn lock_balance(&mut self, user_id: &str) -> Result<Option<Balance>, StoreError>;

    /// Append a record to the transaction log.
    ///
    /// A `transaction_id` that is already present yields `StoreError::Duplicate`.
    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError>;

    /// Overwrite the user's balance. The row must have been locked by this unit.
    async fn update_balance(&mut self, user_id: &str, balance: Balance) -> Result<(), StoreError>;

    /// Make every write of this unit durable and visible.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Persistence port used by handlers
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Find a user whose email or phone matches one of the given values
    async fn find_user_by_contact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    /// Insert a user with a zero balance.
    ///
    /// Email or phone collisions yield `StoreError::Duplicate`.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Replace (or clear) the stored refresh-token digest.
    ///
    /// Returns `false` if the user does not exist.
    async fn set_refresh_token(
        &self,
        user_id: &str,
        digest: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Transactions of a user, oldest first
    async fn list_transactions(&self, user_id: &str)
        -> Result<Vec<TransactionRecord>, StoreError>;

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError>;

    async fn list_user_payment_methods(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserPaymentMethod>, StoreError>;

    /// Attach a payment method to a user.
    ///
    /// An identical `(user_id, method, details)` triple yields
    /// `StoreError::Duplicate`.
    async fn add_user_payment_method(
        &self,
        method: NewUserPaymentMethod,
    ) -> Result<UserPaymentMethod, StoreError>;
}
