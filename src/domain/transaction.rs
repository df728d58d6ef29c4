//! Ledger transaction types
//!
//! Closed enums for transaction status and balance effect, and the
//! validated record written to the transaction log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::{Amount, AmountError, Balance};
use super::error::DomainError;

/// Caller-reported status of a transaction.
///
/// Recorded as provided; the processor never transitions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(DomainError::InvalidValue(
                "Invalid status value. Allowed values are: pending, completed, failed.".to_string(),
            )),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction applied to the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceEffect {
    Add,
    Subtract,
}

impl BalanceEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceEffect::Add => "add",
            BalanceEffect::Subtract => "subtract",
        }
    }

    /// Apply this effect to `balance`.
    ///
    /// A subtraction that would drop below zero yields
    /// `DomainError::InsufficientBalance`.
    pub fn apply(&self, balance: Balance, amount: &Amount) -> Result<Balance, DomainError> {
        match self {
            BalanceEffect::Add => balance.credit(amount).map_err(|e| match e {
                AmountError::Overflow => {
                    DomainError::InvalidValue("Resulting balance is too large".to_string())
                }
                other => DomainError::InvalidValue(other.to_string()),
            }),
            BalanceEffect::Subtract => {
                if !balance.is_sufficient_for(amount) {
                    return Err(DomainError::insufficient_balance(
                        amount.value(),
                        balance.value(),
                    ));
                }
                balance
                    .debit(amount)
                    .map_err(|_| DomainError::insufficient_balance(amount.value(), balance.value()))
            }
        }
    }
}

impl FromStr for BalanceEffect {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(BalanceEffect::Add),
            "subtract" => Ok(BalanceEffect::Subtract),
            _ => Err(DomainError::InvalidValue(
                "Invalid effect value. Allowed values are: add, subtract.".to_string(),
            )),
        }
    }
}

impl fmt::Display for BalanceEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated transaction, ready to be written inside a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub transaction_id: String,
    pub user_id: String,
    pub kind: String,
    pub method: String,
    pub details: Option<String>,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub effect: BalanceEffect,
}

/// A committed row of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub method: String,
    pub details: Option<String>,
    pub amount: i64,
    pub status: TransactionStatus,
    pub effect: BalanceEffect,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn from_new(transaction: &NewTransaction, created_at: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction.transaction_id.clone(),
            user_id: transaction.user_id.clone(),
            kind: transaction.kind.clone(),
            method: transaction.method.clone(),
            details: transaction.details.clone(),
            amount: transaction.amount.value(),
            status: transaction.status,
            effect: transaction.effect,
            created_at,
        }
    }

    /// Signed contribution of this record to the user's balance.
    pub fn signed_amount(&self) -> i64 {
        match self.effect {
            BalanceEffect::Add => self.amount,
            BalanceEffect::Subtract => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "completed".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Completed
        );
        assert!(matches!(
            "cancelled".parse::<TransactionStatus>(),
            Err(DomainError::InvalidValue(_))
        ));
        // Case matters, the wire values are lowercase only
        assert!("Pending".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_effect_parse() {
        assert_eq!("add".parse::<BalanceEffect>().unwrap(), BalanceEffect::Add);
        assert_eq!(
            "subtract".parse::<BalanceEffect>().unwrap(),
            BalanceEffect::Subtract
        );
        assert!(matches!(
            "withdraw".parse::<BalanceEffect>(),
            Err(DomainError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_effect_apply() {
        let balance = Balance::new(100).unwrap();
        let forty = Amount::new(40).unwrap();

        assert_eq!(BalanceEffect::Add.apply(balance, &forty).unwrap().value(), 140);
        assert_eq!(
            BalanceEffect::Subtract.apply(balance, &forty).unwrap().value(),
            60
        );
    }

    #[test]
    fn test_effect_apply_insufficient() {
        let balance = Balance::new(60).unwrap();
        let result = BalanceEffect::Subtract.apply(balance, &Amount::new(100).unwrap());
        assert_eq!(
            result,
            Err(DomainError::InsufficientBalance {
                required: 100,
                available: 60
            })
        );
    }

    #[test]
    fn test_effect_apply_overflow() {
        let balance = Balance::new(i64::MAX).unwrap();
        let result = BalanceEffect::Add.apply(balance, &Amount::new(1).unwrap());
        assert!(matches!(result, Err(DomainError::InvalidValue(_))));
    }

    #[test]
    fn test_record_serializes_wire_names() {
        let record = TransactionRecord {
            transaction_id: "t1".to_string(),
            user_id: "u1".to_string(),
            kind: "payment".to_string(),
            method: "card".to_string(),
            details: None,
            amount: 40,
            status: TransactionStatus::Completed,
            effect: BalanceEffect::Subtract,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["transactionId"], "t1");
        assert_eq!(json["type"], "payment");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["effect"], "subtract");
        assert_eq!(record.signed_amount(), -40);
    }
}
