//! Payment method types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Entry of the payment method catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: i64,
    pub method: String,
    pub details: serde_json::Value,
    pub is_default: Option<bool>,
}

/// Payment method attached to a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPaymentMethod {
    pub id: i64,
    pub user_id: String,
    pub method: String,
    pub details: serde_json::Value,
    pub is_default: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// A validated payment method about to be attached to a user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserPaymentMethod {
    pub user_id: String,
    pub method: String,
    pub details: serde_json::Value,
}
