use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use receiptdesk_core::AdminId;

use crate::Role;

/// Identity token claims (transport-agnostic).
///
/// Timestamps are unix seconds so the token stays interoperable with stock
/// JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the admin account.
    pub sub: AdminId,

    pub email: String,

    pub role: Role,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiration (unix seconds).
    pub exp: i64,
}

impl JwtClaims {
    /// Expiry saturates at the last representable instant.
    pub fn new(sub: AdminId, email: impl Into<String>, role: Role, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = issued_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            sub,
            email: email.into(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims::new(AdminId::new(), "admin@example.test", Role::admin(), now, Duration::hours(24))
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let later = now + Duration::hours(25);
        assert_eq!(validate_claims(&claims_at(now), later), Err(TokenValidationError::Expired));
    }

    #[test]
    fn future_claims_are_not_yet_valid() {
        let now = Utc::now();
        let earlier = now - Duration::minutes(5);
        assert_eq!(
            validate_claims(&claims_at(now), earlier),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let now = Utc::now();
        let claims = JwtClaims::new(AdminId::new(), "admin@example.test", Role::admin(), now, Duration::MAX);
        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
        assert_eq!(validate_claims(&claims, now), Ok(()));
    }
}
