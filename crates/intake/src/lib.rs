//! `receiptdesk-intake`: receipt request intake rules.
//!
//! Cross-checks a submission's MBL, invoice and bank-transaction references
//! against the reference ledger and decides whether (and with which initial
//! status) the request is admitted. Pure business rules: the ledger is consumed
//! through the [`ReferenceLedger`] seam and nothing here touches HTTP or storage.

pub mod admission;
pub mod error;
pub mod identifiers;
pub mod ledger;
pub mod request;

pub use admission::{admit, derive_status, ensure_references_exist};
pub use error::{IntakeError, ReferenceKind};
pub use identifiers::IdentifierSet;
pub use ledger::{LedgerEntry, LedgerError, LedgerField, MatchMode, ReferenceLedger};
pub use request::{AmountInput, CaseType, RequestStatus, StoredRequest, Submission, SubmissionPayload};
