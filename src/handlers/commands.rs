//! Command definitions
//!
//! Commands carry raw request fields; `validate` turns them into domain values
//! or reports the first problem found.

use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::domain::{
    is_valid_email, Amount, BalanceEffect, DomainError, LoginType, NewTransaction,
    NewUserPaymentMethod, TransactionStatus, UserProfile,
};

/// Non-blank string or nothing
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Strings pass through, numbers are rendered, anything else counts as absent
fn present_text(value: Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(text)) => present(Some(text)),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

// =========================================================================
// RecordTransactionCommand
// =========================================================================

/// Command to append a transaction and move the user's balance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionCommand {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    /// Opaque; stored verbatim if a string, as JSON text otherwise
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// JSON number or numeric string, minor units
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
}

impl RecordTransactionCommand {
    /// Check the fields in order: presence, then status/effect membership,
    /// then the amount value.
    pub fn validate(self) -> Result<NewTransaction, DomainError> {
        let user_id = present(self.user_id);
        let transaction_id = present(self.transaction_id);
        let kind = present(self.kind);
        let method = present(self.method);
        let amount = self.amount.filter(|value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::String(text) => !text.trim().is_empty(),
            _ => true,
        });

        let (Some(user_id), Some(transaction_id), Some(kind), Some(method), Some(amount)) =
            (user_id, transaction_id, kind, method, amount)
        else {
            return Err(DomainError::MissingField(
                "Please send transactionId, userId, type, method and amount".to_string(),
            ));
        };

        let status: TransactionStatus = self.status.as_deref().unwrap_or_default().parse()?;
        let effect: BalanceEffect = self.effect.as_deref().unwrap_or_default().parse()?;

        let amount = Amount::from_json(&amount)
            .map_err(|e| DomainError::InvalidValue(format!("Invalid amount: {}", e)))?;

        let details = match self.details {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(text)) => Some(text),
            Some(other) => Some(other.to_string()),
        };

        Ok(NewTransaction {
            transaction_id,
            user_id,
            kind,
            method,
            details,
            amount,
            status,
            effect,
        })
    }
}

/// Result of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_id: String,
    pub user_id: String,
    pub amount: i64,
    pub status: TransactionStatus,
    pub effect: BalanceEffect,
    /// Balance after this transaction
    pub balance: i64,
}

// =========================================================================
// AccountCommand (register / login)
// =========================================================================

/// Command to register or log in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCommand {
    #[serde(default)]
    pub login_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Accepted as a string or a number
    #[serde(default)]
    pub phone: Option<serde_json::Value>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    /// Profile image URL
    #[serde(default)]
    pub img: Option<String>,
}

/// Account fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub login_type: LoginType,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub img: Option<String>,
}

impl AccountCommand {
    pub fn validate(self) -> Result<AccountCredentials, DomainError> {
        let login_type: LoginType = present(self.login_type)
            .ok_or_else(|| DomainError::MissingField("Please provide loginType".to_string()))?
            .parse()?;

        let email = present(self.email);
        let password = self.password.filter(|p| !p.is_empty());
        let phone = present_text(self.phone);

        if login_type == LoginType::Email && email.is_none() {
            return Err(DomainError::InvalidValue(
                "Email address must be provided if loginType is email".to_string(),
            ));
        }
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(DomainError::InvalidEmail);
            }
        }
        if login_type == LoginType::Password && password.is_none() {
            return Err(DomainError::InvalidValue(
                "Password must be provided if loginType is password".to_string(),
            ));
        }
        if login_type == LoginType::Phone && phone.is_none() {
            return Err(DomainError::InvalidValue(
                "Phone number must be provided if loginType is phone".to_string(),
            ));
        }
        if email.is_none() && phone.is_none() {
            return Err(DomainError::MissingField(
                "Email address or phone number must be provided".to_string(),
            ));
        }

        Ok(AccountCredentials {
            login_type,
            email,
            password,
            phone,
            first_name: present(self.first_name),
            last_name: present(self.last_name),
            dob: present(self.dob),
            img: present(self.img),
        })
    }
}

/// Result of register/login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

// =========================================================================
// AddPaymentMethodCommand
// =========================================================================

/// Command to attach a payment method to a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentMethodCommand {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl AddPaymentMethodCommand {
    pub fn validate(self) -> Result<NewUserPaymentMethod, DomainError> {
        let details = self.details.filter(|d| !d.is_null());
        match (present(self.user_id), present(self.method), details) {
            (Some(user_id), Some(method), Some(details)) => Ok(NewUserPaymentMethod {
                user_id,
                method,
                details,
            }),
            _ => Err(DomainError::MissingField(
                "Please send userId, method and details.".to_string(),
            )),
        }
    }
}

/// `{count, rows}` listing
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub count: usize,
    pub rows: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(rows: Vec<T>) -> Self {
        Self {
            count: rows.len(),
            rows,
        }
    }
}
