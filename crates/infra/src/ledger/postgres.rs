//! Postgres-backed reference ledger.
//!
//! Reads the `invoice_mbl` table, whose quoted column names mirror the
//! reference collection (`"BL_No"`, `"Invoice_No"`, `"Bank_Transaction_No"`).
//! The table is populated out-of-band; this adapter only issues `SELECT`s.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use receiptdesk_intake::{LedgerError, LedgerField, MatchMode, ReferenceLedger};

pub struct PostgresLedger {
    pool: PgPool,
    mode: MatchMode,
}

impl PostgresLedger {
    pub fn new(pool: PgPool, mode: MatchMode) -> Self {
        Self { pool, mode }
    }

    /// Column expression and candidate list for the configured match mode.
    fn predicate(&self, field: LedgerField, identifiers: &[String]) -> (String, Vec<String>) {
        let column = format!("\"{}\"", field.column());
        match self.mode {
            MatchMode::Exact => (column, identifiers.to_vec()),
            MatchMode::CaseInsensitive => (
                format!("lower({column})"),
                identifiers.iter().map(|i| i.to_lowercase()).collect(),
            ),
        }
    }
}

fn unavailable(e: sqlx::Error) -> LedgerError {
    LedgerError::Unavailable(e.to_string())
}

#[async_trait]
impl ReferenceLedger for PostgresLedger {
    async fn lookup(&self, field: LedgerField, identifiers: &[String]) -> Result<HashSet<String>, LedgerError> {
        let (expr, candidates) = self.predicate(field, identifiers);
        let sql = format!(
            "SELECT DISTINCT \"{col}\" AS value FROM invoice_mbl WHERE {expr} = ANY($1)",
            col = field.column()
        );

        let rows = sqlx::query(&sql)
            .bind(candidates)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("value"))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(unavailable)
    }

    async fn count(&self, field: LedgerField, identifiers: &[String]) -> Result<u64, LedgerError> {
        let (expr, candidates) = self.predicate(field, identifiers);
        let sql = format!("SELECT COUNT(*) AS n FROM invoice_mbl WHERE {expr} = ANY($1)");

        let n: i64 = sqlx::query(&sql)
            .bind(candidates)
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("n"))
            .map_err(unavailable)?;

        Ok(n.max(0) as u64)
    }

    fn match_mode(&self) -> MatchMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/receiptdesk").unwrap()
    }

    #[tokio::test]
    async fn exact_predicate_quotes_column_and_keeps_candidates() {
        let ledger = PostgresLedger::new(lazy_pool(), MatchMode::Exact);
        let (expr, candidates) = ledger.predicate(LedgerField::BlNo, &["Mbl1".to_string()]);
        assert_eq!(expr, "\"BL_No\"");
        assert_eq!(candidates, ["Mbl1"]);
    }

    #[tokio::test]
    async fn case_insensitive_predicate_lowers_both_sides() {
        let ledger = PostgresLedger::new(lazy_pool(), MatchMode::CaseInsensitive);
        let (expr, candidates) = ledger.predicate(LedgerField::BankTransactionNo, &["UTR1".to_string()]);
        assert_eq!(expr, "lower(\"Bank_Transaction_No\")");
        assert_eq!(candidates, ["utr1"]);
    }
}
