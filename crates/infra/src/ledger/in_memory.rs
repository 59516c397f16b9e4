use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use receiptdesk_intake::{LedgerEntry, LedgerError, LedgerField, MatchMode, ReferenceLedger};

use super::LedgerLoadError;

/// In-memory reference ledger for tests/dev.
///
/// Entries are fixed at construction; lookups never mutate them, so the ledger
/// can be shared across concurrent requests without locking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    entries: Vec<LedgerEntry>,
    mode: MatchMode,
}

impl InMemoryLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries,
            mode: MatchMode::Exact,
        }
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Load entries from a JSON array exported from the reference collection.
    pub fn from_json_file(path: &Path) -> Result<Self, LedgerLoadError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<LedgerEntry> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), entries = entries.len(), "reference ledger loaded");
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matching<'a>(&'a self, field: LedgerField, identifiers: &[String]) -> impl Iterator<Item = &'a str> + 'a {
        let mode = self.mode;
        let wanted: HashSet<String> = identifiers.iter().map(|i| mode.key(i).into_owned()).collect();
        self.entries
            .iter()
            .filter_map(move |e| field.value_of(e))
            .filter(move |v| wanted.contains(&*mode.key(v)))
    }
}

#[async_trait]
impl ReferenceLedger for InMemoryLedger {
    async fn lookup(&self, field: LedgerField, identifiers: &[String]) -> Result<HashSet<String>, LedgerError> {
        Ok(self.matching(field, identifiers).map(str::to_owned).collect())
    }

    async fn count(&self, field: LedgerField, identifiers: &[String]) -> Result<u64, LedgerError> {
        Ok(self.matching(field, identifiers).count() as u64)
    }

    fn match_mode(&self) -> MatchMode {
        self.mode
    }
}
