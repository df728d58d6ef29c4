//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;

use payledger::api::{self, AppState};
use payledger::auth::{IdentityProvider, IdentitySettings};
use payledger::store::MemoryStore;

pub fn identity() -> Arc<IdentityProvider> {
    Arc::new(IdentityProvider::new(IdentitySettings {
        access_secret: "integration-access".to_string(),
        refresh_secret: "integration-refresh".to_string(),
        access_ttl: Duration::from_secs(600),
        refresh_ttl: Duration::from_secs(3600),
        bcrypt_cost: 4,
    }))
}

/// Router over a fresh in-process store
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub identity: Arc<IdentityProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let identity = identity();
        let router = api::build_router(AppState::new(Arc::new(store.clone()), identity.clone()));
        Self {
            router,
            store,
            identity,
        }
    }

    /// Access token for `user_id`
    pub fn token_for(&self, user_id: &str) -> String {
        self.identity.issue_tokens(user_id).unwrap().access_token
    }

    /// Send a request and decode the JSON body (`Value::Null` if not JSON)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

/// Connect to `DATABASE_URL` and empty the ledger tables
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE user_transactions, user_payment_methods, payment_methods, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Insert a user row directly with a starting balance
pub async fn seed_pg_user(pool: &PgPool, user_id: &str, balance: i64) {
    sqlx::query("INSERT INTO users (user_id, balance) VALUES ($1, $2)")
        .bind(user_id)
        .bind(balance)
        .execute(pool)
        .await
        .expect("Failed to seed user");
}
