//! Request admission decision.
//!
//! Three ordered phases:
//! 1. MBL numbers must all exist in the ledger (blocking).
//! 2. Invoice numbers must all exist in the ledger (blocking).
//! 3. The initial status is derived from how many bank references reconcile
//!    (never blocking).
//!
//! The first failing phase rejects the submission and later phases do not run.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use receiptdesk_core::RequestId;

use crate::error::{IntakeError, ReferenceKind};
use crate::identifiers::IdentifierSet;
use crate::ledger::{LedgerField, MatchMode, ReferenceLedger};
use crate::request::{RequestStatus, StoredRequest, Submission};

/// Decide whether `submission` is admitted and with which initial status.
///
/// Ledger failures are propagated as [`IntakeError::TransientIo`] without
/// retrying.
pub async fn admit<L>(
    ledger: &L,
    submission: Submission,
    id: RequestId,
    now: DateTime<Utc>,
) -> Result<StoredRequest, IntakeError>
where
    L: ReferenceLedger + ?Sized,
{
    if let Err(e) = check_blocking(ledger, &submission).await {
        if let IntakeError::ReferenceNotFound { kind, missing } = &e {
            info!(?kind, missing = missing.len(), "submission rejected");
        }
        return Err(e);
    }

    let status = derive_status(ledger, &submission.utr_no).await?;
    info!(request_id = %id, %status, case_type = %submission.case_type, "submission admitted");

    Ok(StoredRequest::admit(id, submission, status, now))
}

async fn check_blocking<L>(ledger: &L, submission: &Submission) -> Result<(), IntakeError>
where
    L: ReferenceLedger + ?Sized,
{
    ensure_references_exist(ledger, ReferenceKind::Mbl, submission.mbl_no.as_deref()).await?;
    ensure_references_exist(ledger, ReferenceKind::Invoice, submission.invoice_no.as_deref()).await
}

/// Blocking check for one identifier class. An absent or blank field passes.
pub async fn ensure_references_exist<L>(
    ledger: &L,
    kind: ReferenceKind,
    raw: Option<&str>,
) -> Result<(), IntakeError>
where
    L: ReferenceLedger + ?Sized,
{
    let requested = IdentifierSet::parse(raw);
    if requested.is_empty() {
        return Ok(());
    }

    let found = ledger.lookup(kind.field(), requested.as_slice()).await?;
    let missing = missing_identifiers(&requested, &found, ledger.match_mode());
    debug!(?kind, requested = requested.len(), missing = missing.len(), "reference check");

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::ReferenceNotFound { kind, missing })
    }
}

/// Initial status from the bank-reference field.
///
/// `Processed` when the number of matching ledger records equals the number of
/// requested references (occurrences, not distinct values); `In Progress`
/// otherwise, including when the field parses to nothing.
pub async fn derive_status<L>(ledger: &L, raw_utr: &str) -> Result<RequestStatus, IntakeError>
where
    L: ReferenceLedger + ?Sized,
{
    let requested = IdentifierSet::parse(Some(raw_utr));
    if requested.is_empty() {
        return Ok(RequestStatus::InProgress);
    }

    let matched = ledger
        .count(LedgerField::BankTransactionNo, requested.as_slice())
        .await?;
    debug!(requested = requested.len(), matched, "bank reference reconciliation");

    // Record count vs occurrence count: duplicated ledger rows can stand in for
    // an unmatched reference, and a repeated reference needs repeated rows.
    if matched == requested.len() as u64 {
        Ok(RequestStatus::Processed)
    } else {
        Ok(RequestStatus::InProgress)
    }
}

fn missing_identifiers(
    requested: &IdentifierSet,
    found: &HashSet<String>,
    mode: MatchMode,
) -> Vec<String> {
    let found: HashSet<String> = found.iter().map(|v| mode.key(v).into_owned()).collect();
    requested
        .iter()
        .filter(|id| !found.contains(&*mode.key(id)))
        .map(str::to_owned)
        .collect()
}
