//! Submission and stored request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use receiptdesk_core::RequestId;

use crate::error::IntakeError;

/// Case type of a receipt request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    Export,
    Import,
    Others,
    #[serde(rename = "Security Deposit")]
    SecurityDeposit,
}

impl CaseType {
    pub const ALL: [CaseType; 4] = [
        CaseType::Export,
        CaseType::Import,
        CaseType::Others,
        CaseType::SecurityDeposit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Export => "Export",
            CaseType::Import => "Import",
            CaseType::Others => "Others",
            CaseType::SecurityDeposit => "Security Deposit",
        }
    }

    /// Export cases must name their MBL numbers.
    pub fn requires_mbl(&self) -> bool {
        matches!(self, CaseType::Export)
    }
}

impl core::fmt::Display for CaseType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for CaseType {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| IntakeError::InvalidEnumValue {
                field: "caseType",
                value: s.to_string(),
            })
    }
}

/// Workflow status of a stored request.
///
/// Only these four values are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Processed,
    Rejected,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Processed,
        RequestStatus::Rejected,
        RequestStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Processed => "Processed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::InProgress => "In Progress",
        }
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RequestStatus {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| IntakeError::InvalidEnumValue {
                field: "status",
                value: s.to_string(),
            })
    }
}

/// Invoice amount as posted: the wizard sends a string, API clients a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn to_amount(&self) -> Result<f64, IntakeError> {
        let (value, shown) = match self {
            AmountInput::Number(n) => (Some(*n), n.to_string()),
            AmountInput::Text(s) => (s.trim().parse::<f64>().ok(), s.clone()),
        };
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(IntakeError::InvalidAmount(shown)),
        }
    }
}

/// Wire shape of a submission. Every field is optional here so that absence
/// is reported as [`IntakeError::MissingRequiredField`]; unknown fields are
/// refused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmissionPayload {
    pub party_name: Option<String>,
    pub email: Option<String>,
    pub utr_no: Option<String>,
    pub invoice_amount: Option<AmountInput>,
    pub case_type: Option<String>,
    pub invoice_no: Option<String>,
    pub mbl_no: Option<String>,
}

/// A validated candidate request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub party_name: String,
    pub email: String,
    pub utr_no: String,
    pub invoice_amount: f64,
    pub case_type: CaseType,
    pub invoice_no: Option<String>,
    pub mbl_no: Option<String>,
}

impl Submission {
    /// Schema-level validation of a posted payload.
    ///
    /// Required: party name, email, UTR number, invoice amount and case type;
    /// MBL number exactly when the case type is Export. Blank strings count as
    /// absent.
    pub fn from_payload(payload: SubmissionPayload) -> Result<Self, IntakeError> {
        let party_name = required("partyName", payload.party_name)?;
        let email = required("email", payload.email)?;
        let utr_no = required("utrNo", payload.utr_no)?;
        let invoice_amount = payload
            .invoice_amount
            .ok_or(IntakeError::MissingRequiredField("invoiceAmount"))?
            .to_amount()?;
        let case_type: CaseType = required("caseType", payload.case_type)?.parse()?;
        let invoice_no = optional(payload.invoice_no);
        let mbl_no = optional(payload.mbl_no);

        if case_type.requires_mbl() && mbl_no.is_none() {
            return Err(IntakeError::MissingRequiredField("mblNo"));
        }

        Ok(Self {
            party_name,
            email,
            utr_no,
            invoice_amount,
            case_type,
            invoice_no,
            mbl_no,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, IntakeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IntakeError::MissingRequiredField(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// An admitted request as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRequest {
    pub id: RequestId,
    /// Always upper-cased.
    pub party_name: String,
    pub email: String,
    pub utr_no: String,
    pub invoice_amount: f64,
    pub case_type: CaseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbl_no: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl StoredRequest {
    pub fn admit(
        id: RequestId,
        submission: Submission,
        status: RequestStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            party_name: submission.party_name.to_uppercase(),
            email: submission.email,
            utr_no: submission.utr_no,
            invoice_amount: submission.invoice_amount,
            case_type: submission.case_type,
            invoice_no: submission.invoice_no,
            mbl_no: submission.mbl_no,
            status,
            created_at,
        }
    }
}
