//! Reference ledger seam.
//!
//! The ledger is an externally maintained dataset correlating bill-of-lading,
//! invoice and bank-transaction identifiers. Intake only reads it.

use std::borrow::Cow;
use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::IntakeError;

/// Ledger column an identifier is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerField {
    BlNo,
    InvoiceNo,
    BankTransactionNo,
}

impl LedgerField {
    /// Column name in the reference store.
    pub fn column(&self) -> &'static str {
        match self {
            LedgerField::BlNo => "BL_No",
            LedgerField::InvoiceNo => "Invoice_No",
            LedgerField::BankTransactionNo => "Bank_Transaction_No",
        }
    }

    pub fn value_of<'a>(&self, entry: &'a LedgerEntry) -> Option<&'a str> {
        match self {
            LedgerField::BlNo => entry.bl_no.as_deref(),
            LedgerField::InvoiceNo => entry.invoice_no.as_deref(),
            LedgerField::BankTransactionNo => entry.bank_transaction_no.as_deref(),
        }
    }
}

/// One reference ledger record, with the field names used by the
/// `invoice_mbl` reference collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
    #[serde(rename = "Payer_Name", default)]
    pub payer_name: Option<String>,
    #[serde(rename = "Bank_Transaction_No", default)]
    pub bank_transaction_no: Option<String>,
    #[serde(rename = "Remark", default)]
    pub remark: Option<String>,
    #[serde(rename = "BL_No", default)]
    pub bl_no: Option<String>,
    #[serde(rename = "Invoice_No", default)]
    pub invoice_no: Option<String>,
}

/// How ledger values are compared with requested identifiers.
///
/// Defaults to exact string equality. Party names are upper-cased on the way
/// in but reference numbers never are, so case folding is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    Exact,
    CaseInsensitive,
}

impl MatchMode {
    /// Comparison key for a value under this mode.
    pub fn key<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            MatchMode::Exact => Cow::Borrowed(value),
            MatchMode::CaseInsensitive => Cow::Owned(value.to_lowercase()),
        }
    }
}

impl FromStr for MatchMode {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "case-insensitive" => Ok(MatchMode::CaseInsensitive),
            other => Err(IntakeError::InvalidEnumValue {
                field: "identifier matching",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("reference ledger unavailable: {0}")]
    Unavailable(String),
}

/// Read-only query capability over the reference ledger.
///
/// Implementations must be safe to call concurrently; the ledger is never
/// mutated by intake.
#[async_trait]
pub trait ReferenceLedger: Send + Sync {
    /// Distinct ledger values of `field` that match any of `identifiers`.
    async fn lookup(
        &self,
        field: LedgerField,
        identifiers: &[String],
    ) -> Result<HashSet<String>, LedgerError>;

    /// Number of ledger records whose `field` matches any of `identifiers`.
    ///
    /// Counts records, not distinct values.
    async fn count(&self, field: LedgerField, identifiers: &[String]) -> Result<u64, LedgerError>;

    fn match_mode(&self) -> MatchMode {
        MatchMode::Exact
    }
}
