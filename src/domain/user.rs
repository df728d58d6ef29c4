//! User types
//!
//! Profile data plus the identity bookkeeping needed for login.

use serde::Serialize;
use std::str::FromStr;

use super::amount::Balance;
use super::error::DomainError;

/// How the user authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginType {
    Email,
    Password,
    Phone,
    /// Any provider the API does not validate specially (e.g. `google`),
    /// kept verbatim so it is stored as sent
    Other(String),
}

impl LoginType {
    pub fn as_str(&self) -> &str {
        match self {
            LoginType::Email => "email",
            LoginType::Password => "password",
            LoginType::Phone => "phone",
            LoginType::Other(raw) => raw,
        }
    }
}

impl FromStr for LoginType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(DomainError::MissingField(
                "Please provide loginType".to_string(),
            )),
            "email" => Ok(LoginType::Email),
            "password" => Ok(LoginType::Password),
            "phone" => Ok(LoginType::Phone),
            other => Ok(LoginType::Other(other.to_string())),
        }
    }
}

/// A stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub img: Option<String>,
    pub login_type: Option<String>,
    pub password_hash: Option<String>,
    pub refresh_token_hash: Option<String>,
    pub balance: Balance,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            dob: self.dob.clone(),
            img: self.img.clone(),
            balance: self.balance.value(),
        }
    }
}

/// Fields for a user about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub img: Option<String>,
    pub login_type: LoginType,
    pub password_hash: Option<String>,
    pub refresh_token_hash: Option<String>,
}

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            dob: self.dob,
            img: self.img,
            login_type: Some(self.login_type.as_str().to_string()),
            password_hash: self.password_hash,
            refresh_token_hash: self.refresh_token_hash,
            balance: Balance::zero(),
        }
    }
}

/// Public view of a user, never carries credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub img: Option<String>,
    pub balance: i64,
}

/// Lightweight email shape check: `local@domain.tld` with a two-letter or longer
/// alphabetic TLD.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}
