//! PostgreSQL store
//!
//! sqlx-backed implementation of the [`LedgerStore`] port. Units of work wrap
//! a `sqlx::Transaction`, which rolls back when dropped without a commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    Balance, NewTransaction, NewUser, NewUserPaymentMethod, PaymentMethod, TransactionRecord,
    User, UserPaymentMethod,
};

use super::{LedgerStore, StoreError, UnitOfWork};

type UserRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

type TransactionRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
    String,
    String,
    DateTime<Utc>,
);

const USER_COLUMNS: &str = r#"
    user_id, first_name, last_name, email, phone, dob, img,
    login_type, password_hash, refresh_token_hash, balance
"#;

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let (
        user_id,
        first_name,
        last_name,
        email,
        phone,
        dob,
        img,
        login_type,
        password_hash,
        refresh_token_hash,
        balance,
    ) = row;

    let balance = Balance::new(balance)
        .map_err(|e| StoreError::InvalidRow(format!("users.balance for {}: {}", user_id, e)))?;

    Ok(User {
        user_id,
        first_name,
        last_name,
        email,
        phone,
        dob,
        img,
        login_type,
        password_hash,
        refresh_token_hash,
        balance,
    })
}

fn transaction_from_row(row: TransactionRow) -> Result<TransactionRecord, StoreError> {
    let (transaction_id, user_id, kind, method, details, amount, status, effect, created_at) = row;

    let status = status
        .parse()
        .map_err(|_| StoreError::InvalidRow(format!("user_transactions.status = {}", status)))?;
    let effect = effect
        .parse()
        .map_err(|_| StoreError::InvalidRow(format!("user_transactions.effect = {}", effect)))?;

    Ok(TransactionRecord {
        transaction_id,
        user_id,
        kind,
        method,
        details,
        amount,
        status,
        effect,
        created_at,
    })
}

/// PostgreSQL-backed ledger store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unit of work on a single PostgreSQL transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_balance(&mut self, user_id: &str) -> Result<Option<Balance>, StoreError> {
        // FOR UPDATE holds the row until commit/rollback, so concurrent
        // units for the same user queue here and read the committed value.
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        balance
            .map(|value| {
                Balance::new(value).map_err(|e| {
                    StoreError::InvalidRow(format!("users.balance for {}: {}", user_id, e))
                })
            })
            .transpose()
    }

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, StoreError> {
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO user_transactions
                (transaction_id, user_id, "type", method, details, amount, status, effect)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING created_at
            "#,
        )
        .bind(&transaction.transaction_id)
        .bind(&transaction.user_id)
        .bind(&transaction.kind)
        .bind(&transaction.method)
        .bind(transaction.details.as_deref())
        .bind(transaction.amount.value())
        .bind(transaction.status.as_str())
        .bind(transaction.effect.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(TransactionRecord::from_new(transaction, created_at))
    }

    async fn update_balance(&mut self, user_id: &str, balance: Balance) -> Result<(), StoreError> {
        let rows_affected = sqlx::query(
            "UPDATE users SET balance = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(balance.value())
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if rows_affected != 1 {
            return Err(StoreError::InvalidRow(format!(
                "balance update touched {} rows for {}",
                rows_affected, user_id
            )));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn find_user_by_contact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::text IS NOT NULL AND email = $1)
               OR ($2::text IS NOT NULL AND phone = $2)
            ORDER BY created_at
            LIMIT 1
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(user_from_row).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (user_id, first_name, last_name, email, phone, dob, img,
                 login_type, password_hash, refresh_token_hash, balance)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0)
            "#,
        )
        .bind(&user.user_id)
        .bind(user.first_name.as_deref())
        .bind(user.last_name.as_deref())
        .bind(user.email.as_deref())
        .bind(user.phone.as_deref())
        .bind(user.dob.as_deref())
        .bind(user.img.as_deref())
        .bind(user.login_type.as_str())
        .bind(user.password_hash.as_deref())
        .bind(user.refresh_token_hash.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(user.into_user())
    }

    async fn set_refresh_token(
        &self,
        user_id: &str,
        digest: Option<&str>,
    ) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(digest)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT transaction_id, user_id, "type", method, details,
                   amount, status, effect, created_at
            FROM user_transactions
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }

    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, StoreError> {
        let rows: Vec<(i64, String, serde_json::Value, Option<bool>)> = sqlx::query_as(
            "SELECT id, method, details, is_default FROM payment_methods ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, method, details, is_default)| PaymentMethod {
                id,
                method,
                details,
                is_default,
            })
            .collect())
    }

    async fn list_user_payment_methods(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserPaymentMethod>, StoreError> {
        let rows: Vec<(i64, String, String, serde_json::Value, Option<bool>, DateTime<Utc>)> =
            sqlx::query_as(
                r#"
                SELECT id, user_id, method, details, is_default, created_at
                FROM user_payment_methods
                WHERE user_id = $1
                ORDER BY id
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, user_id, method, details, is_default, created_at)| UserPaymentMethod {
                    id,
                    user_id,
                    method,
                    details,
                    is_default,
                    created_at,
                },
            )
            .collect())
    }

    async fn add_user_payment_method(
        &self,
        method: NewUserPaymentMethod,
    ) -> Result<UserPaymentMethod, StoreError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO user_payment_methods (user_id, method, details)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&method.user_id)
        .bind(&method.method)
        .bind(&method.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserPaymentMethod {
            id,
            user_id: method.user_id,
            method: method.method,
            details: method.details,
            is_default: None,
            created_at,
        })
    }
}
