use serde::{Deserialize, Serialize};

use receiptdesk_auth::AdminAccount;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// Public view of an admin; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub email: String,
    pub role: String,
}

impl From<&AdminAccount> for AdminView {
    fn from(account: &AdminAccount) -> Self {
        Self {
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminView,
}

#[derive(Debug, Serialize)]
pub struct RegisteredAdmin {
    pub id: String,
    #[serde(flatten)]
    pub admin: AdminView,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<&AdminAccount> for RegisteredAdmin {
    fn from(account: &AdminAccount) -> Self {
        Self {
            id: account.id.to_string(),
            admin: AdminView::from(account),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OtpVerified {
    pub message: &'static str,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn registered_admin_hides_the_password_hash() {
        let account = AdminAccount::register("root@example.test", "pw", Utc::now()).unwrap();
        let json = serde_json::to_value(RegisteredAdmin::from(&account)).unwrap();
        assert_eq!(json["email"], "root@example.test");
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
    }
}
