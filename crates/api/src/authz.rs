//! API-side authorization guard for admin routes.

use receiptdesk_auth::{AuthzError, Permission, Principal, authorize};

use crate::context::PrincipalContext;

/// Check that the current principal's role grants `permission`.
pub fn require(principal: &PrincipalContext, permission: &Permission) -> Result<(), AuthzError> {
    let principal = Principal::for_role(principal.admin_id(), principal.role().clone());
    authorize(&principal, permission)
}
