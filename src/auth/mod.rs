//! Username/password login and bearer tokens.
//!
//! Passwords are compared as unsalted SHA-256 hex digests and tokens are
//! HS256 JWTs. This is a placeholder for a real identity provider, not a
//! hardened implementation.

mod jwt;

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthSettings;

pub use jwt::Claims;

/// Errors from authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Malformed token")]
    MalformedToken,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Token has no subject")]
    MissingSubject,
    #[error("Token has expired")]
    Expired,
    #[error("Token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Hash a password the way configured users are stored.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// A user allowed to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// Issues and checks access tokens for configured users.
#[derive(Clone)]
pub struct AuthService {
    users: HashMap<String, User>,
    secret: Vec<u8>,
    token_ttl: chrono::Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("users", &self.users.keys().collect::<Vec<_>>())
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Build from settings. Without a configured secret a random one is
    /// generated, so tokens do not survive a restart.
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = match settings.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("No JWT secret configured; generated a random one (tokens reset on restart)");
                random_secret()
            }
        };

        let users: HashMap<String, User> = settings
            .users
            .iter()
            .map(|u| {
                (
                    u.username.clone(),
                    User {
                        username: u.username.clone(),
                        password_hash: u.password_hash.to_lowercase(),
                        role: u.role.clone(),
                    },
                )
            })
            .collect();
        if users.is_empty() {
            warn!("No users configured; login is disabled (set ADMIN_USERNAME and ADMIN_PASSWORD)");
        }

        Self {
            users,
            secret,
            token_ttl: chrono::Duration::minutes(settings.token_ttl_minutes),
        }
    }

    /// Secret used to sign tokens. Also the fallback key for signed file URLs.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Check a username and password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        let user = self.users.get(username)?;
        if user.password_hash == hash_password(password) {
            Some(user)
        } else {
            debug!("password mismatch for {}", username);
            None
        }
    }

    /// Issue a token for a user.
    pub fn create_access_token(&self, user: &User) -> Result<String, AuthError> {
        let exp = (chrono::Utc::now() + self.token_ttl).timestamp();
        jwt::encode(
            &Claims {
                sub: user.username.clone(),
                role: user.role.clone(),
                exp,
            },
            &self.secret,
        )
    }

    /// Validate a token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        jwt::decode(token, &self.secret, chrono::Utc::now().timestamp())
    }
}

fn random_secret() -> Vec<u8> {
    let mut secret = Vec::with_capacity(32);
    secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    secret
}
