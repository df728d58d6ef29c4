//! Transaction Handler
//!
//! Records a transaction and moves the user's balance in one atomic unit.

use std::sync::Arc;

use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::store::{LedgerStore, StoreError};

use super::{authorize, RecordTransactionCommand, TransactionReceipt};

// =========================================================================
// RecordTransactionHandler
// =========================================================================

/// Handler for `recordTransaction`
pub struct RecordTransactionHandler {
    store: Arc<dyn LedgerStore>,
}

impl RecordTransactionHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Execute the record command.
    ///
    /// The transaction row and the balance change are committed together or
    /// not at all. Concurrent commands for the same user are serialized by the
    /// row lock taken in `lock_balance`, so each one sees the balance the
    /// previous one committed.
    pub async fn execute(
        &self,
        command: RecordTransactionCommand,
        context: &OperationContext,
    ) -> Result<TransactionReceipt, AppError> {
        let transaction = command.validate()?;

        authorize(context, &transaction.user_id)?;

        // Dropping `unit` on any early return rolls the whole thing back
        let mut unit = self.store.begin().await?;

        // Lock before inserting: the log row's foreign key would otherwise
        // take a share lock that two writers then both try to upgrade.
        let balance = unit
            .lock_balance(&transaction.user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(transaction.user_id.clone()))?;

        unit.insert_transaction(&transaction)
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AppError::Domain(DomainError::AlreadyExists(format!(
                    "Transaction {} already exists",
                    transaction.transaction_id
                ))),
                other => other.into(),
            })?;

        let new_balance = match transaction.effect.apply(balance, &transaction.amount) {
            Ok(new_balance) => new_balance,
            Err(e) => {
                tracing::warn!(
                    correlation_id = ?context.correlation_id,
                    user_id = %transaction.user_id,
                    transaction_id = %transaction.transaction_id,
                    amount = transaction.amount.value(),
                    balance = balance.value(),
                    "Transaction rejected: {}",
                    e
                );
                return Err(e.into());
            }
        };

        unit.update_balance(&transaction.user_id, new_balance)
            .await?;

        unit.commit().await?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            user_id = %transaction.user_id,
            transaction_id = %transaction.transaction_id,
            effect = %transaction.effect,
            amount = transaction.amount.value(),
            balance = new_balance.value(),
            "Transaction recorded"
        );

        Ok(TransactionReceipt {
            transaction_id: transaction.transaction_id,
            user_id: transaction.user_id,
            amount: transaction.amount.value(),
            status: transaction.status,
            effect: transaction.effect,
            balance: new_balance.value(),
        })
    }
}
