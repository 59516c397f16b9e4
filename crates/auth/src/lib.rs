//! `receiptdesk-auth`: admin identity and user verification primitives.
//!
//! This crate is intentionally decoupled from HTTP and storage: it signs and
//! validates identity tokens, hashes admin passwords and models one-time
//! passcodes, but never decides where any of them are kept.

pub mod account;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod permissions;
pub mod roles;

pub use account::{AccountError, AdminAccount, normalize_email};
pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator, TokenError};
pub use otp::{OtpChallenge, OtpCode};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use roles::Role;
