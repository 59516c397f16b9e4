//! Domain error model.

use thiserror::Error;

/// Deterministic failures of pure domain code: absent required values and
/// identifiers that do not parse. Infrastructure failures live elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("invalid {kind} '{value}': {reason}")]
    InvalidId {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

impl DomainError {
    pub fn required(field: &'static str) -> Self {
        Self::Required { field }
    }
}
