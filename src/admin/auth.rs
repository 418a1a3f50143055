/*!
 * Administrator authentication.
 *
 * A single administrator logs in with the configured email and password
 * and receives an opaque bearer token. Only the SHA-256 digest of each
 * token is kept in memory, together with its expiry; tokens do not
 * survive a restart.
 */

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::app_config::AdminConfig;
use crate::errors::AdminError;

/// Token handed to the administrator after login
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies administrator tokens
#[derive(Clone)]
pub struct AdminAuth {
    email_digest: [u8; 32],
    password_digest: [u8; 32],
    ttl: Duration,
    /// Token digest (hex) to expiry
    tokens: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn token_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Equality that inspects every byte regardless of where they differ
fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl AdminAuth {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            email_digest: digest(&config.email),
            password_digest: digest(&config.password),
            ttl: Duration::hours(config.session_ttl_hours),
            tokens: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check credentials and issue a token
    pub fn login(&self, email: &str, password: &str) -> Result<AdminToken, AdminError> {
        // both comparisons always run
        let email_ok = constant_time_eq(&digest(email), &self.email_digest);
        let password_ok = constant_time_eq(&digest(password), &self.password_digest);
        if !(email_ok & password_ok) {
            info!("Rejected admin login attempt");
            return Err(AdminError::InvalidCredentials);
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.ttl;
        self.tokens.lock().insert(token_key(&token), expires_at);
        info!("Admin logged in, token valid until {}", expires_at);

        Ok(AdminToken { token, expires_at })
    }

    /// Accept a live token
    pub fn verify(&self, token: &str) -> Result<(), AdminError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AdminError> {
        let key = token_key(token);
        let mut tokens = self.tokens.lock();

        match tokens.get(&key) {
            Some(expires_at) if *expires_at > now => Ok(()),
            Some(_) => {
                tokens.remove(&key);
                debug!("Admin token expired");
                Err(AdminError::Unauthorized)
            }
            None => Err(AdminError::Unauthorized),
        }
    }

    /// Revoke a token; false when it was not known
    pub fn logout(&self, token: &str) -> bool {
        self.tokens.lock().remove(&token_key(token)).is_some()
    }

    /// Drop expired tokens, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut tokens = self.tokens.lock();
        let before = tokens.len();
        tokens.retain(|_, expires_at| *expires_at > now);
        before - tokens.len()
    }

    /// Number of live or not yet purged tokens
    pub fn active_tokens(&self) -> usize {
        self.tokens.lock().len()
    }
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("ttl_hours", &self.ttl.num_hours())
            .field("active_tokens", &self.active_tokens())
            .finish()
    }
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
