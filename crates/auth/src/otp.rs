//! One-time passcodes for requester email verification.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A six-digit numeric passcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(100_000u32..1_000_000).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a submitted code equals this one (surrounding whitespace ignored).
    pub fn matches(&self, submitted: &str) -> bool {
        self.0 == submitted.trim()
    }
}

impl From<&str> for OtpCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl core::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An outstanding passcode for one email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub email: String,
    pub code: OtpCode,
    pub issued_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn new(email: impl Into<String>, code: OtpCode, issued_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            code,
            issued_at,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.issued_at
            && self
                .issued_at
                .checked_add_signed(ttl)
                .is_none_or(|expires_at| now < expires_at)
    }

    /// Live and matching.
    pub fn accepts(&self, submitted: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.is_live(now, ttl) && self.code.matches(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let code = OtpCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn challenge_expires_after_ttl() {
        let issued = Utc::now();
        let ch = OtpChallenge::new("a@b.c", OtpCode::from("123456"), issued);
        let ttl = Duration::seconds(300);

        assert!(ch.accepts("123456", issued + Duration::seconds(299), ttl));
        assert!(!ch.accepts("123456", issued + Duration::seconds(300), ttl));
    }

    #[test]
    fn wrong_code_is_refused() {
        let issued = Utc::now();
        let ch = OtpChallenge::new("a@b.c", OtpCode::from("123456"), issued);
        assert!(!ch.accepts("654321", issued, Duration::seconds(300)));
        assert!(ch.accepts(" 123456 ", issued, Duration::seconds(300)));
    }

    #[test]
    fn oversized_ttl_never_expires() {
        let issued = Utc::now();
        let ch = OtpChallenge::new("a@b.c", OtpCode::from("123456"), issued);
        assert!(ch.is_live(issued + Duration::days(365), Duration::MAX));
    }
}
