//! Persistence for admitted requests, admin accounts and OTP challenges.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAdminStore, InMemoryOtpStore, InMemoryRequestStore};
pub use postgres::{PostgresAdminStore, PostgresRequestStore, migrate};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use receiptdesk_auth::{AdminAccount, OtpChallenge};
use receiptdesk_core::RequestId;
use receiptdesk_intake::{RequestStatus, StoredRequest};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Request counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total: u64,
    pub pending: u64,
    pub processed: u64,
    pub rejected: u64,
    pub in_progress: u64,
    pub total_invoice_amount: f64,
}

impl StatusSummary {
    pub fn record(&mut self, request: &StoredRequest) {
        self.total += 1;
        self.total_invoice_amount += request.invoice_amount;
        match request.status {
            RequestStatus::Pending => self.pending += 1,
            RequestStatus::Processed => self.processed += 1,
            RequestStatus::Rejected => self.rejected += 1,
            RequestStatus::InProgress => self.in_progress += 1,
        }
    }
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, request: StoredRequest) -> Result<(), StoreError>;

    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError>;

    /// All requests, newest first.
    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError>;

    /// Overwrite the status. Returns the updated request, or `None` if the id
    /// is unknown.
    async fn update_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<Option<StoredRequest>, StoreError>;

    async fn summary(&self) -> Result<StatusSummary, StoreError> {
        let mut summary = StatusSummary::default();
        for request in self.list().await? {
            summary.record(&request);
        }
        Ok(summary)
    }
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if the email is taken.
    async fn insert(&self, account: AdminAccount) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError>;
}

/// One outstanding challenge per email.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Replace any existing challenge for the same email.
    async fn put(&self, challenge: OtpChallenge) -> Result<(), StoreError>;

    /// Consume the challenge for `email` if it is live and `code` matches.
    async fn take(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<bool, StoreError>;
}
