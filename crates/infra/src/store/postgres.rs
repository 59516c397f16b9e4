//! Postgres-backed request and admin stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | Pool / network / decode | N/A | `Unavailable` |
//!
//! Status and case type are stored as their display strings and guarded by
//! `CHECK` constraints; a row that still fails to parse is `Corrupt`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use receiptdesk_auth::{AdminAccount, Role, normalize_email};
use receiptdesk_core::{AdminId, RequestId};
use receiptdesk_intake::{CaseType, RequestStatus, StoredRequest};

use super::{AdminStore, RequestStore, StatusSummary, StoreError};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS invoice_mbl (
        id BIGSERIAL PRIMARY KEY,
        "Amount" DOUBLE PRECISION,
        "Payer_Name" TEXT,
        "Bank_Transaction_No" TEXT,
        "Remark" TEXT,
        "BL_No" TEXT,
        "Invoice_No" TEXT
    )"#,
    r#"CREATE INDEX IF NOT EXISTS invoice_mbl_bl_no_idx ON invoice_mbl ("BL_No")"#,
    r#"CREATE INDEX IF NOT EXISTS invoice_mbl_invoice_no_idx ON invoice_mbl ("Invoice_No")"#,
    r#"CREATE INDEX IF NOT EXISTS invoice_mbl_utr_idx ON invoice_mbl ("Bank_Transaction_No")"#,
    r#"CREATE TABLE IF NOT EXISTS receipt_requests (
        id UUID PRIMARY KEY,
        party_name TEXT NOT NULL,
        email TEXT NOT NULL,
        utr_no TEXT NOT NULL,
        invoice_amount DOUBLE PRECISION NOT NULL CHECK (invoice_amount >= 0),
        case_type TEXT NOT NULL CHECK (case_type IN ('Export', 'Import', 'Others', 'Security Deposit')),
        invoice_no TEXT,
        mbl_no TEXT,
        status TEXT NOT NULL CHECK (status IN ('Pending', 'Processed', 'Rejected', 'In Progress')),
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS receipt_requests_created_at_idx ON receipt_requests (created_at DESC)"#,
    r#"CREATE TABLE IF NOT EXISTS admin_users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
];

/// Create the tables this service reads and writes, if missing.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
    }
    info!(statements = SCHEMA.len(), "database schema ensured");
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            if db_err.code().as_deref() == Some("23505") {
                StoreError::Conflict(msg)
            } else {
                StoreError::Unavailable(msg)
            }
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

struct RequestRow {
    id: Uuid,
    party_name: String,
    email: String,
    utr_no: String,
    invoice_amount: f64,
    case_type: String,
    invoice_no: Option<String>,
    mbl_no: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for RequestRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(RequestRow {
            id: row.try_get("id")?,
            party_name: row.try_get("party_name")?,
            email: row.try_get("email")?,
            utr_no: row.try_get("utr_no")?,
            invoice_amount: row.try_get("invoice_amount")?,
            case_type: row.try_get("case_type")?,
            invoice_no: row.try_get("invoice_no")?,
            mbl_no: row.try_get("mbl_no")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<RequestRow> for StoredRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let case_type: CaseType = row
            .case_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("request {}: {e}", row.id)))?;
        let status: RequestStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("request {}: {e}", row.id)))?;

        Ok(StoredRequest {
            id: RequestId::from_uuid(row.id),
            party_name: row.party_name,
            email: row.email,
            utr_no: row.utr_no,
            invoice_amount: row.invoice_amount,
            case_type,
            invoice_no: row.invoice_no,
            mbl_no: row.mbl_no,
            status,
            created_at: row.created_at,
        })
    }
}

const REQUEST_COLUMNS: &str =
    "id, party_name, email, utr_no, invoice_amount, case_type, invoice_no, mbl_no, status, created_at";

#[derive(Clone)]
pub struct PostgresRequestStore {
    pool: PgPool,
}

impl PostgresRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for PostgresRequestStore {
    async fn insert(&self, request: StoredRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO receipt_requests
                (id, party_name, email, utr_no, invoice_amount, case_type, invoice_no, mbl_no, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*request.id.as_uuid())
        .bind(&request.party_name)
        .bind(&request.email)
        .bind(&request.utr_no)
        .bind(request.invoice_amount)
        .bind(request.case_type.as_str())
        .bind(&request.invoice_no)
        .bind(&request.mbl_no)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_request", e))?;
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM receipt_requests WHERE id = $1");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_request", e))?;
        row.map(StoredRequest::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM receipt_requests ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_requests", e))?;
        rows.into_iter().map(StoredRequest::try_from).collect()
    }

    async fn update_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<Option<StoredRequest>, StoreError> {
        let sql = format!("UPDATE receipt_requests SET status = $2 WHERE id = $1 RETURNING {REQUEST_COLUMNS}");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(*id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_status", e))?;
        row.map(StoredRequest::try_from).transpose()
    }

    async fn summary(&self) -> Result<StatusSummary, StoreError> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS n, COALESCE(SUM(invoice_amount), 0) AS amount FROM receipt_requests GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("summary", e))?;

        let mut summary = StatusSummary::default();
        for row in rows {
            let status: String = row.try_get("status").map_err(|e| map_sqlx_error("summary", e))?;
            let n: i64 = row.try_get("n").map_err(|e| map_sqlx_error("summary", e))?;
            let amount: f64 = row.try_get("amount").map_err(|e| map_sqlx_error("summary", e))?;
            let n = n.max(0) as u64;

            let status: RequestStatus = status
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("summary: {e}")))?;
            match status {
                RequestStatus::Pending => summary.pending += n,
                RequestStatus::Processed => summary.processed += n,
                RequestStatus::Rejected => summary.rejected += n,
                RequestStatus::InProgress => summary.in_progress += n,
            }
            summary.total += n;
            summary.total_invoice_amount += amount;
        }
        Ok(summary)
    }
}

#[derive(Clone)]
pub struct PostgresAdminStore {
    pool: PgPool,
}

impl PostgresAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PostgresAdminStore {
    async fn insert(&self, account: AdminAccount) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO admin_users (id, email, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*account.id.as_uuid())
        .bind(normalize_email(&account.email))
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_admin", e))?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM admin_users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_admin", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let read = |e: sqlx::Error| map_sqlx_error("find_admin", e);
        let id: Uuid = row.try_get("id").map_err(read)?;
        let role: String = row.try_get("role").map_err(read)?;
        Ok(Some(AdminAccount {
            id: AdminId::from_uuid(id),
            email: row.try_get("email").map_err(read)?,
            password_hash: row.try_get("password_hash").map_err(read)?,
            role: Role::new(role),
            created_at: row.try_get("created_at").map_err(read)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_checks_match_the_enum_spellings() {
        let requests = SCHEMA
            .iter()
            .find(|s| s.contains("CREATE TABLE IF NOT EXISTS receipt_requests"))
            .unwrap();
        for case in CaseType::ALL {
            assert!(requests.contains(&format!("'{}'", case.as_str())), "{case}");
        }
        for status in RequestStatus::ALL {
            assert!(requests.contains(&format!("'{}'", status.as_str())), "{status}");
        }
    }

    #[test]
    fn unparseable_row_is_corrupt() {
        let row = RequestRow {
            id: Uuid::nil(),
            party_name: "ACME".into(),
            email: "a@b.c".into(),
            utr_no: "UTR1".into(),
            invoice_amount: 1.0,
            case_type: "Import".into(),
            invoice_no: None,
            mbl_no: None,
            status: "Done".into(),
            created_at: Utc::now(),
        };
        assert!(matches!(StoredRequest::try_from(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error("list_requests", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
