use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role carried in identity tokens.
///
/// Tokens hold only the role; what a role may do is decided here at check
/// time, so changing the policy never requires reissuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    const ADMIN: &'static str = "admin";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The dashboard administrator role.
    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Permissions granted by this role. Unknown roles get none.
    pub fn permissions(&self) -> Vec<Permission> {
        if self.is_admin() {
            vec![Permission::ALL]
        } else {
            Vec::new()
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_the_wildcard() {
        assert!(Role::admin().is_admin());
        assert_eq!(Role::admin().permissions(), vec![Permission::ALL]);
    }

    #[test]
    fn other_roles_hold_nothing() {
        let viewer = Role::new("viewer");
        assert!(!viewer.is_admin());
        assert!(viewer.permissions().is_empty());
    }

    #[test]
    fn serializes_as_bare_string() {
        assert_eq!(serde_json::to_string(&Role::admin()).unwrap(), "\"admin\"");
    }
}
