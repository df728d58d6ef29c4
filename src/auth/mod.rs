//! Identity provider
//!
//! Issues and verifies JWT access/refresh tokens and hashes passwords.
//!
//! - Access and refresh tokens are HS256 JWTs signed with separate secrets
//! - Passwords are hashed with bcrypt, off the async runtime threads
//! - Refresh tokens are stored as SHA-256 digests, never in plain text

mod error;
mod password;
mod tokens;

pub use error::AuthError;
pub use tokens::{Claims, TokenKind, TokenPair};

use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::Config;

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl From<&Config> for IdentitySettings {
    fn from(config: &Config) -> Self {
        Self {
            access_secret: config.jwt_access_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// JWT + bcrypt identity provider
pub struct IdentityProvider {
    access_keys: SigningKeys,
    refresh_keys: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl IdentityProvider {
    pub fn new(settings: IdentitySettings) -> Self {
        Self {
            access_keys: SigningKeys::from_secret(settings.access_secret.as_bytes()),
            refresh_keys: SigningKeys::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh token pair for `user_id`
    pub fn issue_tokens(&self, user_id: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    fn issue(&self, user_id: &str, kind: TokenKind) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, kind, self.ttl(kind));
        tokens::encode(&claims, &self.keys(kind).encoding)
    }

    /// Resolve the user behind an access token
    pub fn verify_identity(&self, token: &str) -> Result<String, AuthError> {
        let claims = tokens::decode(token, &self.access_keys.decoding)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.sub)
    }

    /// Hash a password
    pub async fn hash_secret(&self, secret: &str) -> Result<String, AuthError> {
        password::hash(secret.to_string(), self.bcrypt_cost).await
    }

    /// Check a password against a stored hash
    pub async fn verify_secret(&self, secret: &str, hash: &str) -> bool {
        password::verify(secret.to_string(), hash.to_string()).await
    }
}

/// SHA-256 hex digest used to store refresh tokens
pub fn token_digest(token: &str) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> IdentityProvider {
        IdentityProvider::new(IdentitySettings {
            access_secret: "access-secret".to_string(),
            refresh_secret: "refresh-secret".to_string(),
            access_ttl: Duration::from_secs(3600),
            refresh_ttl: Duration::from_secs(7200),
            bcrypt_cost: 4,
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let provider = test_provider();
        let pair = provider.issue_tokens("u1").unwrap();

        assert_eq!(provider.verify_identity(&pair.access_token).unwrap(), "u1");
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let provider = test_provider();
        let pair = provider.issue_tokens("u1").unwrap();

        let result = provider.verify_identity(&pair.refresh_token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let provider = test_provider();
        let other = IdentityProvider::new(IdentitySettings {
            access_secret: "someone-else".to_string(),
            refresh_secret: "refresh-secret".to_string(),
            access_ttl: Duration::from_secs(3600),
            refresh_ttl: Duration::from_secs(7200),
            bcrypt_cost: 4,
        });
        let pair = other.issue_tokens("u1").unwrap();

        assert!(matches!(
            provider.verify_identity(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let provider = test_provider();
        assert!(matches!(
            provider.verify_identity("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_hash_and_verify_secret() {
        let provider = test_provider();
        let hash = provider.hash_secret("S3cret!pw").await.unwrap();

        assert_ne!(hash, "S3cret!pw");
        assert!(provider.verify_secret("S3cret!pw", &hash).await);
        assert!(!provider.verify_secret("wrong", &hash).await);
        assert!(!provider.verify_secret("S3cret!pw", "not-a-hash").await);
    }

    #[test]
    fn test_token_digest() {
        let digest = token_digest("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
