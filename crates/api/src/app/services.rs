//! Service wiring: ledger, stores, mailer and token signer behind one handle.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use receiptdesk_auth::{AccountError, AdminAccount, Hs256Jwt, OtpChallenge, OtpCode, PasswordError, TokenError};
use receiptdesk_core::RequestId;
use receiptdesk_infra::ledger::{InMemoryLedger, LedgerLoadError, PostgresLedger};
use receiptdesk_infra::mailer::{LogMailer, MailError, OtpMailer};
use receiptdesk_infra::store::{
    AdminStore, InMemoryAdminStore, InMemoryOtpStore, InMemoryRequestStore, OtpStore, PostgresAdminStore,
    PostgresRequestStore, RequestStore, StatusSummary, StoreError, migrate,
};
use receiptdesk_intake::{
    IntakeError, ReferenceLedger, RequestStatus, StoredRequest, Submission, SubmissionPayload, admit,
};

use crate::config::{AppConfig, BootstrapAdmin};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),
}

/// Failures while assembling services at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    LedgerSeed(#[from] LedgerLoadError),

    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Account(#[from] AccountError),
}

pub struct AppServices {
    pub ledger: Arc<dyn ReferenceLedger>,
    pub requests: Arc<dyn RequestStore>,
    pub admins: Arc<dyn AdminStore>,
    pub otps: Arc<dyn OtpStore>,
    pub mailer: Arc<dyn OtpMailer>,
    pub jwt: Hs256Jwt,
    pub admin_registration: bool,
}

/// Pick Postgres when a database URL is configured, in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, BuildError> {
    let services = match &config.database_url {
        Some(url) => build_persistent_services(config, url).await?,
        None => build_in_memory_services(config)?,
    };

    if let Some(admin) = &config.bootstrap_admin {
        services.bootstrap_admin(admin).await?;
    }

    Ok(services)
}

fn build_in_memory_services(config: &AppConfig) -> Result<AppServices, BuildError> {
    let ledger = match &config.ledger_seed_path {
        Some(path) => InMemoryLedger::from_json_file(path)?,
        None => {
            warn!("no DATABASE_URL or LEDGER_SEED_PATH; reference ledger is empty");
            InMemoryLedger::default()
        }
    }
    .with_match_mode(config.identifier_matching);

    Ok(AppServices::in_memory(Arc::new(ledger), config))
}

async fn build_persistent_services(config: &AppConfig, url: &str) -> Result<AppServices, BuildError> {
    let pool = PgPool::connect(url).await?;
    migrate(&pool).await?;
    info!("using postgres-backed ledger and stores");

    Ok(AppServices {
        ledger: Arc::new(PostgresLedger::new(pool.clone(), config.identifier_matching)),
        requests: Arc::new(PostgresRequestStore::new(pool.clone())),
        admins: Arc::new(PostgresAdminStore::new(pool)),
        otps: Arc::new(InMemoryOtpStore::new(config.otp_ttl)),
        mailer: Arc::new(LogMailer),
        jwt: Hs256Jwt::new(config.jwt_secret().as_bytes(), config.token_ttl),
        admin_registration: config.admin_registration,
    })
}

impl AppServices {
    /// In-memory stores around the given ledger (dev/test).
    pub fn in_memory(ledger: Arc<dyn ReferenceLedger>, config: &AppConfig) -> Self {
        Self {
            ledger,
            requests: Arc::new(InMemoryRequestStore::new()),
            admins: Arc::new(InMemoryAdminStore::new()),
            otps: Arc::new(InMemoryOtpStore::new(config.otp_ttl)),
            mailer: Arc::new(LogMailer),
            jwt: Hs256Jwt::new(config.jwt_secret().as_bytes(), config.token_ttl),
            admin_registration: config.admin_registration,
        }
    }

    /// Validate, run the admission decision, and persist on acceptance.
    pub async fn submit(&self, payload: SubmissionPayload) -> Result<StoredRequest, ServiceError> {
        let submission = Submission::from_payload(payload)?;
        let stored = admit(self.ledger.as_ref(), submission, RequestId::new(), Utc::now()).await?;
        self.requests.insert(stored.clone()).await?;
        Ok(stored)
    }

    pub async fn list_requests(&self) -> Result<Vec<StoredRequest>, ServiceError> {
        Ok(self.requests.list().await?)
    }

    pub async fn summary(&self) -> Result<StatusSummary, ServiceError> {
        Ok(self.requests.summary().await?)
    }

    /// Admin override; no admission checks are re-run.
    pub async fn update_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        updated_by: &str,
    ) -> Result<StoredRequest, ServiceError> {
        let updated = self
            .requests
            .update_status(id, status)
            .await?
            .ok_or(ServiceError::NotFound("Request not found"))?;
        info!(request_id = %id, status = %status, updated_by, "request status updated");
        Ok(updated)
    }

    /// Returns a signed token and the account it was issued for.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, AdminAccount), ServiceError> {
        let account = self
            .admins
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("User not found"))?;

        if !account.verify_password(password)? {
            return Err(ServiceError::BadRequest("Invalid credentials"));
        }

        let token = self
            .jwt
            .issue(account.id, &account.email, account.role.clone(), Utc::now())?;
        info!(admin_id = %account.id, "admin signed in");
        Ok((token, account))
    }

    pub async fn register_admin(&self, email: &str, password: &str) -> Result<AdminAccount, ServiceError> {
        if !self.admin_registration {
            return Err(ServiceError::NotFound("Not found"));
        }
        let account = AdminAccount::register(email, password, Utc::now())?;
        self.admins.insert(account.clone()).await?;
        info!(admin_id = %account.id, "admin registered");
        Ok(account)
    }

    async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<(), BuildError> {
        if self.admins.find_by_email(&admin.email).await?.is_some() {
            return Ok(());
        }
        let account = AdminAccount::register(&admin.email, &admin.password, Utc::now())?;
        self.admins.insert(account).await?;
        info!(email = %admin.email, "bootstrap admin created");
        Ok(())
    }

    /// Issue a fresh code for `email`, replacing any outstanding one.
    pub async fn send_otp(&self, email: &str) -> Result<(), ServiceError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ServiceError::BadRequest("Email is required"));
        }

        let code = OtpCode::generate(&mut rand::thread_rng());
        self.otps
            .put(OtpChallenge::new(email, code.clone(), Utc::now()))
            .await?;
        self.mailer.send_otp(email, &code).await?;
        Ok(())
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ServiceError> {
        if self.otps.take(email, otp, Utc::now()).await? {
            Ok(())
        } else {
            Err(ServiceError::BadRequest("Invalid or expired OTP"))
        }
    }
}
