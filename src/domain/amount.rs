//! Amount and Balance types
//!
//! Domain primitives for monetary values held in minor units (cents).
//! All values are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amount represents a validated, strictly positive monetary delta.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Value is a whole number of minor units
///
/// # Example
/// ```
/// use payledger::domain::Amount;
///
/// let amount: Amount = "40".parse().unwrap();
/// assert_eq!(amount.value(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "i64")]
pub struct Amount(i64);

/// Largest magnitude below which every whole `f64` is exact (2^53)
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Balance cannot be negative (got {0})")]
    Negative(i64),

    #[error("Amount must be a whole number of minor units (got {0})")]
    Fractional(String),

    #[error("Amount exceeds the representable range")]
    Overflow,

    #[error("Amount {0} cannot be represented exactly; send it as a string")]
    Inexact(String),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Build an amount from a decimal holding a whole number of minor units.
    pub fn from_decimal(decimal: Decimal) -> Result<Self, AmountError> {
        if !decimal.fract().is_zero() {
            return Err(AmountError::Fractional(decimal.to_string()));
        }
        let value = decimal.to_i64().ok_or(AmountError::Overflow)?;
        Self::new(value)
    }

    /// Build an amount from a JSON number or numeric string.
    ///
    /// Non-integer JSON numbers arrive as `f64`; beyond 2^53 they can no longer
    /// hold the value the client wrote and are refused.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AmountError> {
        match value {
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    return Self::new(int);
                }
                if number.as_u64().is_some() {
                    return Err(AmountError::Overflow);
                }
                let float = number
                    .as_f64()
                    .filter(|f| f.abs() <= MAX_EXACT_FLOAT)
                    .ok_or_else(|| AmountError::Inexact(number.to_string()))?;
                let decimal = Decimal::try_from(float)
                    .map_err(|e| AmountError::ParseError(e.to_string()))?;
                Self::from_decimal(decimal)
            }
            serde_json::Value::String(text) => Self::from_str(text),
            other => Err(AmountError::ParseError(other.to_string())),
        }
    }

    /// Get the underlying value in minor units.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "40.0" is accepted, "40.5" is not
        let decimal = Decimal::from_str(s.trim())
            .map_err(|_| AmountError::ParseError(s.to_string()))?;
        Amount::from_decimal(decimal)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance represents a user's running balance (zero or positive).
/// Unlike Amount, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check if balance is sufficient for withdrawal
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        let new_value = self
            .0
            .checked_add(amount.value())
            .ok_or(AmountError::Overflow)?;
        Balance::new(new_value)
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl TryFrom<i64> for Balance {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(100);
        assert_eq!(amount.unwrap().value(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert!(matches!(Amount::new(0), Err(AmountError::NotPositive(0))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(Amount::new(-5), Err(AmountError::NotPositive(-5))));
    }

    #[test]
    fn test_amount_from_str() {
        assert_eq!("250".parse::<Amount>().unwrap().value(), 250);
        assert_eq!(" 40.0 ".parse::<Amount>().unwrap().value(), 40);
        assert!(matches!(
            "40.5".parse::<Amount>(),
            Err(AmountError::Fractional(_))
        ));
        assert!(matches!(
            "forty".parse::<Amount>(),
            Err(AmountError::ParseError(_))
        ));
    }

    #[test]
    fn test_amount_from_json() {
        assert_eq!(Amount::from_json(&json!(40)).unwrap().value(), 40);
        assert_eq!(Amount::from_json(&json!("25")).unwrap().value(), 25);
        assert!(Amount::from_json(&json!(12.5)).is_err());
        assert!(Amount::from_json(&json!(-3)).is_err());
        assert!(Amount::from_json(&json!(true)).is_err());
        assert!(matches!(
            Amount::from_json(&json!(u64::MAX)),
            Err(AmountError::Overflow)
        ));
    }

    #[test]
    fn test_large_decimal_strings_stay_exact() {
        assert!(matches!(
            "9007199254740993.5".parse::<Amount>(),
            Err(AmountError::Fractional(_))
        ));
        assert_eq!(
            "9007199254740993.0".parse::<Amount>().unwrap().value(),
            9_007_199_254_740_993
        );
        assert!(matches!(
            "9223372036854775808.0".parse::<Amount>(),
            Err(AmountError::Overflow)
        ));
    }

    #[test]
    fn test_large_json_floats_rejected() {
        assert!(matches!(
            Amount::from_json(&json!(9007199254740993.5)),
            Err(AmountError::Inexact(_))
        ));
        assert_eq!(Amount::from_json(&json!(40.0)).unwrap().value(), 40);
        assert_eq!(
            Amount::from_json(&json!(9007199254740993_i64)).unwrap().value(),
            9_007_199_254_740_993
        );
    }

    #[test]
    fn test_amount_from_decimal() {
        assert_eq!(Amount::from_decimal(dec!(40.00)).unwrap().value(), 40);
        assert!(matches!(
            Amount::from_decimal(dec!(0.01)),
            Err(AmountError::Fractional(_))
        ));
    }

    #[test]
    fn test_balance_credit_debit() {
        let balance = Balance::new(100).unwrap();

        let balance = balance.debit(&Amount::new(40).unwrap()).unwrap();
        assert_eq!(balance.value(), 60);

        let balance = balance.credit(&Amount::new(25).unwrap()).unwrap();
        assert_eq!(balance.value(), 85);
    }

    #[test]
    fn test_balance_debit_to_zero() {
        let balance = Balance::new(60).unwrap();
        let balance = balance.debit(&Amount::new(60).unwrap()).unwrap();
        assert_eq!(balance, Balance::zero());
    }

    #[test]
    fn test_balance_insufficient() {
        let balance = Balance::new(60).unwrap();
        let amount = Amount::new(100).unwrap();

        assert!(!balance.is_sufficient_for(&amount));
        assert!(matches!(balance.debit(&amount), Err(AmountError::Negative(-40))));
    }

    #[test]
    fn test_balance_credit_overflow() {
        let balance = Balance::new(i64::MAX).unwrap();
        let result = balance.credit(&Amount::new(1).unwrap());
        assert!(matches!(result, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_balance_rejects_negative_json() {
        let result: Result<Balance, _> = serde_json::from_str("-1");
        assert!(result.is_err());
    }
}
