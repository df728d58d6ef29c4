//! Payment Method Handler

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext, PaymentMethod, UserPaymentMethod};
use crate::error::AppError;
use crate::store::{LedgerStore, StoreError};

use super::{authorize, AddPaymentMethodCommand, Listing};

/// Catalog of payment methods and the methods attached to each user
pub struct PaymentMethodHandler {
    store: Arc<dyn LedgerStore>,
}

impl PaymentMethodHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Methods offered by the platform
    pub async fn catalog(&self) -> Result<Listing<PaymentMethod>, AppError> {
        Ok(self.store.list_payment_methods().await?.into())
    }

    /// Methods attached to `user_id`
    pub async fn list_for_user(
        &self,
        user_id: &str,
        context: &OperationContext,
    ) -> Result<Listing<UserPaymentMethod>, AppError> {
        authorize(context, user_id)?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(user_id.to_string()).into());
        }

        Ok(self.store.list_user_payment_methods(user_id).await?.into())
    }

    /// Attach a method to a user; the same method with the same details
    /// can only be attached once.
    pub async fn add(
        &self,
        command: AddPaymentMethodCommand,
        context: &OperationContext,
    ) -> Result<UserPaymentMethod, AppError> {
        let method = command.validate()?;

        authorize(context, &method.user_id)?;

        if self.store.find_user(&method.user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(method.user_id).into());
        }

        let added = self
            .store
            .add_user_payment_method(method)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AppError::Domain(DomainError::AlreadyExists(
                    "This user already has this method and the associated details added."
                        .to_string(),
                )),
                other => other.into(),
            })?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            user_id = %added.user_id,
            method = %added.method,
            "Payment method added"
        );

        Ok(added)
    }
}
