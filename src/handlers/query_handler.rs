//! User Query Handler
//!
//! Read side: profile and transaction history.

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext, TransactionRecord, UserProfile};
use crate::error::AppError;
use crate::store::LedgerStore;

use super::{authorize, Listing};

pub struct UserQueryHandler {
    store: Arc<dyn LedgerStore>,
}

impl UserQueryHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn details(
        &self,
        user_id: &str,
        context: &OperationContext,
    ) -> Result<UserProfile, AppError> {
        authorize(context, user_id)?;

        self.store
            .find_user(user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| DomainError::UserNotFound(user_id.to_string()).into())
    }

    /// Transaction log of a user, oldest first
    pub async fn transactions(
        &self,
        user_id: &str,
        context: &OperationContext,
    ) -> Result<Listing<TransactionRecord>, AppError> {
        authorize(context, user_id)?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(user_id.to_string()).into());
        }

        Ok(self.store.list_transactions(user_id).await?.into())
    }
}
