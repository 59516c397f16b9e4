//! Admin accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use receiptdesk_core::{AdminId, DomainError};

use crate::password::{PasswordError, hash_password, verify_password};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Canonical form of an email used as a lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An admin able to sign in to the dashboard.
///
/// # Invariants
/// - `email` is stored normalized (trimmed, lower-cased) and is unique.
/// - `password_hash` is an Argon2 PHC string; the plaintext is never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: AdminId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl AdminAccount {
    pub fn register(email: &str, password: &str, now: DateTime<Utc>) -> Result<Self, AccountError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DomainError::required("email").into());
        }
        if password.is_empty() {
            return Err(DomainError::required("password").into());
        }

        Ok(Self {
            id: AdminId::new(),
            email,
            password_hash: hash_password(password)?,
            role: Role::admin(),
            created_at: now,
        })
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, PasswordError> {
        verify_password(password, &self.password_hash)
    }
}
