//! Reference ledger adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedger;
pub use postgres::PostgresLedger;

use thiserror::Error;

/// Failure loading a ledger seed file.
#[derive(Debug, Error)]
pub enum LedgerLoadError {
    #[error("failed to read ledger seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger seed is not a JSON array of entries: {0}")]
    Parse(#[from] serde_json::Error),
}
