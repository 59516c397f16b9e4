//! Process configuration, read from environment variables.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use receiptdesk_intake::MatchMode;
use receiptdesk_observability::LogFormat;

/// Signing secret used when `JWT_SECRET` is unset. Dev only.
pub const DEV_JWT_SECRET: &str = "dev-secret";

/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// One day.
pub const MAX_OTP_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Credentials for the admin created at startup if it does not exist yet.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    /// `None` means fall back to [`DEV_JWT_SECRET`].
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
    pub database_url: Option<String>,
    pub ledger_seed_path: Option<PathBuf>,
    pub identifier_matching: MatchMode,
    pub otp_ttl: Duration,
    pub admin_registration: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: None,
            token_ttl: Duration::hours(24),
            database_url: None,
            ledger_seed_path: None,
            identifier_matching: MatchMode::Exact,
            otp_ttl: Duration::seconds(300),
            admin_registration: false,
            bootstrap_admin: None,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|e| invalid("PORT", e))?,
            None => defaults.port,
        };

        let token_ttl = match get("TOKEN_TTL_HOURS") {
            Some(v) => {
                let hours = bounded("TOKEN_TTL_HOURS", &v, MAX_TOKEN_TTL_HOURS)?;
                Duration::try_hours(hours).ok_or_else(|| invalid("TOKEN_TTL_HOURS", "out of range"))?
            }
            None => defaults.token_ttl,
        };

        let otp_ttl = match get("OTP_TTL_SECS") {
            Some(v) => {
                let secs = bounded("OTP_TTL_SECS", &v, MAX_OTP_TTL_SECS)?;
                Duration::try_seconds(secs).ok_or_else(|| invalid("OTP_TTL_SECS", "out of range"))?
            }
            None => defaults.otp_ttl,
        };

        let identifier_matching = match get("IDENTIFIER_MATCHING") {
            Some(v) => v.parse::<MatchMode>().map_err(|e| invalid("IDENTIFIER_MATCHING", e))?,
            None => defaults.identifier_matching,
        };

        let admin_registration = match get("ADMIN_REGISTRATION") {
            Some(v) => flag("ADMIN_REGISTRATION", &v)?,
            None => defaults.admin_registration,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(|e| invalid("LOG_FORMAT", e))?,
            None => defaults.log_format,
        };

        let bootstrap_admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(invalid("ADMIN_PASSWORD", "required when ADMIN_EMAIL is set"));
            }
            (None, Some(_)) => {
                return Err(invalid("ADMIN_EMAIL", "required when ADMIN_PASSWORD is set"));
            }
        };

        Ok(Self {
            port,
            jwt_secret: get("JWT_SECRET"),
            token_ttl,
            database_url: get("DATABASE_URL"),
            ledger_seed_path: get("LEDGER_SEED_PATH").map(PathBuf::from),
            identifier_matching,
            otp_ttl,
            admin_registration,
            bootstrap_admin,
            log_format,
        })
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn bounded(var: &'static str, value: &str, max: i64) -> Result<i64, ConfigError> {
    let n = value.parse::<i64>().map_err(|e| invalid(var, e))?;
    if n <= 0 {
        return Err(invalid(var, "must be greater than zero"));
    }
    if n > max {
        return Err(invalid(var, format!("must be at most {max}")));
    }
    Ok(n)
}

fn flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(invalid(var, format!("expected a boolean, got `{other}`"))),
    }
}
