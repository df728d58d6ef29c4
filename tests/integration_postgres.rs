//! PostgreSQL store integration tests
//!
//! Need a migrated database in `DATABASE_URL`.
//! Run with: cargo test --test integration_postgres -- --ignored --test-threads=1

use std::sync::Arc;

use serde_json::json;

use payledger::domain::{DomainError, NewUserPaymentMethod, OperationContext};
use payledger::handlers::{RecordTransactionCommand, RecordTransactionHandler};
use payledger::store::{LedgerStore, PgStore, StoreError};
use payledger::AppError;

mod common;

fn record(user_id: &str, transaction_id: &str, amount: i64, effect: &str) -> RecordTransactionCommand {
    serde_json::from_value(json!({
        "userId": user_id,
        "transactionId": transaction_id,
        "type": "payment",
        "method": "card",
        "amount": amount,
        "status": "completed",
        "effect": effect
    }))
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_schema_present() {
    let pool = common::setup_test_db().await;
    payledger::db::verify_connection(&pool).await.unwrap();
    assert!(payledger::db::check_schema(&pool).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_record_and_reject() {
    let pool = common::setup_test_db().await;
    common::seed_pg_user(&pool, "pg-u1", 100).await;
    let store = Arc::new(PgStore::new(pool.clone()));
    let handler = RecordTransactionHandler::new(store.clone());
    let context = OperationContext::new();

    let receipt = handler
        .execute(record("pg-u1", "pg-t1", 40, "subtract"), &context)
        .await
        .unwrap();
    assert_eq!(receipt.balance, 60);

    let rejected = handler
        .execute(record("pg-u1", "pg-t2", 100, "subtract"), &context)
        .await;
    assert!(matches!(
        rejected,
        Err(AppError::Domain(DomainError::InsufficientBalance { .. }))
    ));

    let duplicate = handler
        .execute(record("pg-u1", "pg-t1", 5, "add"), &context)
        .await;
    assert!(matches!(
        duplicate,
        Err(AppError::Domain(DomainError::AlreadyExists(_)))
    ));

    let user = store.find_user("pg-u1").await.unwrap().unwrap();
    assert_eq!(user.balance.value(), 60);
    let log = store.list_transactions("pg-u1").await.unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_dropped_unit_rolls_back() {
    let pool = common::setup_test_db().await;
    common::seed_pg_user(&pool, "pg-u2", 10).await;
    let store = PgStore::new(pool.clone());

    {
        let mut unit = store.begin().await.unwrap();
        let balance = unit.lock_balance("pg-u2").await.unwrap().unwrap();
        assert_eq!(balance.value(), 10);
        unit.update_balance("pg-u2", payledger::Balance::zero())
            .await
            .unwrap();
    }

    let user = store.find_user("pg-u2").await.unwrap().unwrap();
    assert_eq!(user.balance.value(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_subtracts() {
    let pool = common::setup_test_db().await;
    common::seed_pg_user(&pool, "pg-u3", 100).await;
    let handler = Arc::new(RecordTransactionHandler::new(Arc::new(PgStore::new(
        pool.clone(),
    ))));

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .execute(
                        record("pg-u3", &format!("pg-c{}", i), 30, "subtract"),
                        &OperationContext::new(),
                    )
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    let balance: i64 = sqlx::query_scalar("SELECT balance FROM users WHERE user_id = 'pg-u3'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let logged: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM user_transactions WHERE user_id = 'pg-u3'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(succeeded, 3);
    assert_eq!(balance, 10);
    assert_eq!(100 - logged, balance);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_payment_method() {
    let pool = common::setup_test_db().await;
    common::seed_pg_user(&pool, "pg-u4", 0).await;
    let store = PgStore::new(pool);

    let method = NewUserPaymentMethod {
        user_id: "pg-u4".to_string(),
        method: "card".to_string(),
        details: json!({"last4": "4242"}),
    };
    store.add_user_payment_method(method.clone()).await.unwrap();
    let again = store.add_user_payment_method(method).await;

    assert!(matches!(again, Err(StoreError::Duplicate(_))));
    assert_eq!(store.list_user_payment_methods("pg-u4").await.unwrap().len(), 1);
}
