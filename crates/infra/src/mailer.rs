//! Outbound delivery of one-time passcodes.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use receiptdesk_auth::OtpCode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, email: &str, code: &OtpCode) -> Result<(), MailError>;
}

/// Writes the passcode to the log instead of sending mail.
///
/// Stands in for a real provider in dev and tests; the code lands under the
/// `mock_mail` target so it can be filtered separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, email: &str, code: &OtpCode) -> Result<(), MailError> {
        info!(target: "mock_mail", to = %email, code = %code, "otp email");
        Ok(())
    }
}
