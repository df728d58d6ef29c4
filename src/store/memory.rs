//! In-process store
//!
//! Implements the [`LedgerStore`] port over shared in-memory tables, for tests
//! and local runs without PostgreSQL. A unit of work holds the store-wide lock
//! for its whole lifetime and stages its writes; they are applied on commit and
//! discarded on drop.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Balance, NewTransaction, NewUser, NewUserPaymentMethod, PaymentMethod, TransactionRecord,
    User, UserPaymentMethod,
};

use super::{LedgerStore, StoreError, UnitOfWork};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, User>,
    transactions: Vec<TransactionRecord>,
    payment_methods: Vec<PaymentMethod>,
    user_payment_methods: Vec<UserPaymentMethod>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_transaction(&self, transaction_id: &str) -> bool {
        self.transactions
            .iter()
            .any(|t| t.transaction_id == transaction_id)
    }
}

/// In-memory ledger store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with a starting balance
    pub async fn seed_user(&self, user_id: &str, balance: Balance) {
        let mut tables = self.tables.lock().await;
        tables.users.insert(
            user_id.to_string(),
            User {
                user_id: user_id.to_string(),
                first_name: None,
                last_name: None,
                email: None,
                phone: None,
                dob: None,
                img: None,
                login_type: None,
                password_hash: None,
                refresh_token_hash: None,
                balance,
            },
        );
    }

    /// Add an entry to the payment method catalog
    pub async fn seed_payment_method(&self, method: &str, details: serde_json::Value) -> i64 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.payment_methods.push(PaymentMethod {
            id,
            method: method.to_string(),
            details,
            is_default: None,
        });
        id
    }
}

/// Unit of work holding the store lock
pub struct MemoryUnitOfWork {
    tables: OwnedMutexGuard<Tables>,
    inserted: Vec<TransactionRecord>,
    balances: HashMap<String, Balance>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_balance(&mut self, user_id: &str) -> Result<Option<Balance>, StoreError> {
        if let Some(staged) = self.balances.get(user_id) {
            return Ok(Some(*staged));
        }
        Ok(self.tables.users.get(user_id).map(|user| user.balance))
    }

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        let id = &transaction.transaction_id;
        if self.tables.has_transaction(id) || self.inserted.iter().any(|t| &t.transaction_id == id)
        {
            return Err(StoreError::Duplicate(format!("transaction_id {}", id)));
        }
        if !self.tables.users.contains_key(&transaction.user_id) {
            return Err(StoreError::InvalidRow(format!(
                "transaction references unknown user {}",
                transaction.user_id
            )));
        }

        let record = TransactionRecord::from_new(transaction, Utc::now());
        self.inserted.push(record.clone());
        Ok(record)
    }

    async fn update_balance(&mut self, user_id: &str, balance: Balance) -> Result<(), StoreError> {
        if !self.tables.users.contains_key(user_id) {
            return Err(StoreError::InvalidRow(format!(
                "balance update for unknown user {}",
                user_id
            )));
        }
        self.balances.insert(user_id.to_string(), balance);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork {
            mut tables,
            inserted,
            balances,
        } = *self;

        tables.transactions.extend(inserted);
        for (user_id, balance) in balances {
            if let Some(user) = tables.users.get_mut(&user_id) {
                user.balance = balance;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tables = self.tables.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            tables,
            inserted: Vec::new(),
            balances: HashMap::new(),
        }))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(user_id).cloned())
    }

    async fn find_user_by_contact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        let found = tables.users.values().find(|user| {
            let email_match = email.is_some() && user.email.as_deref() == email;
            let phone_match = phone.is_some() && user.phone.as_deref() == phone;
            email_match || phone_match
        });
        Ok(found.cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.users.contains_key(&user.user_id) {
            return Err(StoreError::Duplicate(format!("user_id {}", user.user_id)));
        }
        let taken = tables.users.values().any(|existing| {
            (user.email.is_some() && existing.email == user.email)
                || (user.phone.is_some() && existing.phone == user.phone)
        });
        if taken {
            return Err(StoreError::Duplicate("email or phone".to_string()));
        }

        let user = user.into_user();
        tables.users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn set_refresh_token(
        &self,
        user_id: &str,
        digest: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        match tables.users.get_mut(user_id) {
            Some(user) => {
                user.refresh_token_hash = digest.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        Ok(self.tables.lock().await.payment_methods.clone())
    }

    async fn list_user_payment_methods(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserPaymentMethod>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .user_payment_methods
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_user_payment_method(
        &self,
        method: NewUserPaymentMethod,
    ) -> Result<UserPaymentMethod, StoreError> {
        let mut tables = self.tables.lock().await;

        let exists = tables.user_payment_methods.iter().any(|m| {
            m.user_id == method.user_id && m.method == method.method && m.details == method.details
        });
        if exists {
            return Err(StoreError::Duplicate(
                "user_payment_methods (user_id, method, details)".to_string(),
            ));
        }

        let record = UserPaymentMethod {
            id: tables.next_id(),
            user_id: method.user_id,
            method: method.method,
            details: method.details,
            is_default: None,
            created_at: Utc::now(),
        };
        tables.user_payment_methods.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, BalanceEffect, TransactionStatus};

    fn new_transaction(transaction_id: &str, user_id: &str, amount: i64) -> NewTransaction {
        NewTransaction {
            transaction_id: transaction_id.to_string(),
            user_id: user_id.to_string(),
            kind: "payment".to_string(),
            method: "card".to_string(),
            details: None,
            amount: Amount::new(amount).unwrap(),
            status: TransactionStatus::Completed,
            effect: BalanceEffect::Add,
        }
    }

    #[tokio::test]
    async fn test_commit_applies_staged_writes() {
        let store = MemoryStore::new();
        store.seed_user("u1", Balance::new(10).unwrap()).await;

        let mut unit = store.begin().await.unwrap();
        unit.insert_transaction(&new_transaction("t1", "u1", 5))
            .await
            .unwrap();
        unit.update_balance("u1", Balance::new(15).unwrap())
            .await
            .unwrap();
        assert_eq!(
            unit.lock_balance("u1").await.unwrap(),
            Some(Balance::new(15).unwrap())
        );
        unit.commit().await.unwrap();

        let user = store.find_user("u1").await.unwrap().unwrap();
        assert_eq!(user.balance.value(), 15);
        assert_eq!(store.list_transactions("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_discards_staged_writes() {
        let store = MemoryStore::new();
        store.seed_user("u1", Balance::new(10).unwrap()).await;

        {
            let mut unit = store.begin().await.unwrap();
            unit.insert_transaction(&new_transaction("t1", "u1", 5))
                .await
                .unwrap();
            unit.update_balance("u1", Balance::new(15).unwrap())
                .await
                .unwrap();
        }

        let user = store.find_user("u1").await.unwrap().unwrap();
        assert_eq!(user.balance.value(), 10);
        assert!(store.list_transactions("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_transaction_id() {
        let store = MemoryStore::new();
        store.seed_user("u1", Balance::zero()).await;

        let mut unit = store.begin().await.unwrap();
        unit.insert_transaction(&new_transaction("t1", "u1", 5))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        let mut unit = store.begin().await.unwrap();
        let result = unit.insert_transaction(&new_transaction("t1", "u1", 7)).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_balance() {
        let store = MemoryStore::new();
        let mut unit = store.begin().await.unwrap();
        assert_eq!(unit.lock_balance("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_payment_method_uniqueness() {
        let store = MemoryStore::new();
        store.seed_user("u1", Balance::zero()).await;

        let method = NewUserPaymentMethod {
            user_id: "u1".to_string(),
            method: "card".to_string(),
            details: serde_json::json!({"last4": "4242"}),
        };
        store.add_user_payment_method(method.clone()).await.unwrap();
        let second = store.add_user_payment_method(method).await;
        assert!(matches!(second, Err(StoreError::Duplicate(_))));
    }
}
