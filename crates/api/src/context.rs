use receiptdesk_auth::Role;
use receiptdesk_core::AdminId;

/// Principal context for a request (authenticated admin + role).
///
/// Inserted by the auth middleware; present on every admin route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    admin_id: AdminId,
    email: String,
    role: Role,
}

impl PrincipalContext {
    pub fn new(admin_id: AdminId, email: impl Into<String>, role: Role) -> Self {
        Self {
            admin_id,
            email: email.into(),
            role,
        }
    }

    pub fn admin_id(&self) -> AdminId {
        self.admin_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
