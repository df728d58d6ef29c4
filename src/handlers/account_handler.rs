//! Account Handler
//!
//! Register, login and logout.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{token_digest, AuthError, IdentityProvider};
use crate::domain::{DomainError, NewUser, OperationContext, User};
use crate::error::AppError;
use crate::store::{LedgerStore, StoreError};

use super::{AccountCommand, AccountCredentials, AuthResult};

pub struct AccountHandler {
    store: Arc<dyn LedgerStore>,
    identity: Arc<IdentityProvider>,
}

impl AccountHandler {
    pub fn new(store: Arc<dyn LedgerStore>, identity: Arc<IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Create a new user; fails if the email or phone is already taken
    pub async fn register(
        &self,
        command: AccountCommand,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        let credentials = command.validate()?;

        let existing = self
            .store
            .find_user_by_contact(credentials.email.as_deref(), credentials.phone.as_deref())
            .await?;
        if existing.is_some() {
            return Err(DomainError::UserAlreadyExists.into());
        }

        self.create_account(credentials, context).await
    }

    /// Log in, creating the account on first contact
    pub async fn login(
        &self,
        command: AccountCommand,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        let credentials = command.validate()?;

        let user = self
            .store
            .find_user_by_contact(credentials.email.as_deref(), credentials.phone.as_deref())
            .await?;

        let Some(user) = user else {
            return self.create_account(credentials, context).await;
        };

        self.check_password(&user, credentials.password).await?;

        let tokens = self.identity.issue_tokens(&user.user_id)?;
        let digest = token_digest(&tokens.refresh_token);
        if !self
            .store
            .set_refresh_token(&user.user_id, Some(&digest))
            .await?
        {
            return Err(DomainError::UserNotFound(user.user_id).into());
        }

        tracing::info!(
            correlation_id = ?context.correlation_id,
            user_id = %user.user_id,
            "User logged in"
        );

        Ok(AuthResult {
            profile: user.profile(),
            tokens,
        })
    }

    /// Clear the stored refresh token of `user_id`
    pub async fn logout(&self, user_id: &str, context: &OperationContext) -> Result<(), AppError> {
        if !self.store.set_refresh_token(user_id, None).await? {
            return Err(DomainError::UserNotFound(user_id.to_string()).into());
        }

        tracing::info!(
            correlation_id = ?context.correlation_id,
            user_id = %user_id,
            "User logged out"
        );
        Ok(())
    }

    /// A stored password must be matched; a password sent for an account
    /// without one is refused.
    async fn check_password(&self, user: &User, password: Option<String>) -> Result<(), AppError> {
        match (password, &user.password_hash) {
            (None, None) => Ok(()),
            (Some(password), Some(hash)) => {
                if self.identity.verify_secret(&password, hash).await {
                    Ok(())
                } else {
                    Err(AuthError::InvalidPassword.into())
                }
            }
            _ => Err(AuthError::InvalidPassword.into()),
        }
    }

    async fn create_account(
        &self,
        credentials: AccountCredentials,
        context: &OperationContext,
    ) -> Result<AuthResult, AppError> {
        let user_id = Uuid::new_v4().to_string();
        let tokens = self.identity.issue_tokens(&user_id)?;

        let password_hash = match &credentials.password {
            Some(password) => Some(self.identity.hash_secret(password).await?),
            None => None,
        };

        let new_user = NewUser {
            user_id,
            first_name: credentials.first_name,
            last_name: credentials.last_name,
            email: credentials.email,
            phone: credentials.phone,
            dob: credentials.dob,
            img: credentials.img,
            login_type: credentials.login_type,
            password_hash,
            refresh_token_hash: Some(token_digest(&tokens.refresh_token)),
        };

        // A concurrent registration can still win the unique constraint
        let user = self.store.create_user(new_user).await.map_err(|e| match e {
            StoreError::Duplicate(_) => AppError::Domain(DomainError::UserAlreadyExists),
            other => other.into(),
        })?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            user_id = %user.user_id,
            login_type = user.login_type.as_deref().unwrap_or_default(),
            "User registered"
        );

        Ok(AuthResult {
            profile: user.profile(),
            tokens,
        })
    }
}
