//! Intake error model.

use thiserror::Error;

use crate::ledger::{LedgerError, LedgerField};

/// Identifier class checked by a blocking validation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Mbl,
    Invoice,
}

impl ReferenceKind {
    pub fn field(&self) -> LedgerField {
        match self {
            ReferenceKind::Mbl => LedgerField::BlNo,
            ReferenceKind::Invoice => LedgerField::InvoiceNo,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Mbl => "MBL Numbers",
            ReferenceKind::Invoice => "Invoice Numbers",
        }
    }
}

/// Why a submission could not be admitted.
///
/// Every variant carries enough detail to render a user-facing message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntakeError {
    /// Referenced identifiers are unknown to the ledger. `missing` keeps the
    /// submission's order, including repeats.
    #[error(
        "Wrong number: The following {} were not found in our records: {}",
        .kind.label(),
        .missing.join(", ")
    )]
    ReferenceNotFound {
        kind: ReferenceKind,
        missing: Vec<String>,
    },

    #[error("{0} is required")]
    MissingRequiredField(&'static str),

    #[error("'{value}' is not a valid {field}")]
    InvalidEnumValue { field: &'static str, value: String },

    #[error("invoiceAmount must be a non-negative number, got '{0}'")]
    InvalidAmount(String),

    /// Ledger (or other IO) failure, propagated as-is.
    #[error(transparent)]
    TransientIo(#[from] LedgerError),
}

impl IntakeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::ReferenceNotFound { .. } => "reference_not_found",
            IntakeError::MissingRequiredField(_) => "missing_required_field",
            IntakeError::InvalidEnumValue { .. } => "invalid_enum_value",
            IntakeError::InvalidAmount(_) => "invalid_amount",
            IntakeError::TransientIo(_) => "transient_io",
        }
    }
}
