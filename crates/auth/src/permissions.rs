use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A capability checked on admin routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// List requests and read the dashboard summary.
    pub const REQUESTS_READ: Permission = Permission(Cow::Borrowed("requests.read"));

    /// Override a request's status.
    pub const REQUESTS_UPDATE_STATUS: Permission = Permission(Cow::Borrowed("requests.update_status"));

    /// Satisfies every check.
    pub const ALL: Permission = Permission(Cow::Borrowed("*"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether holding `self` satisfies a check for `required`.
    pub fn grants(&self, required: &Permission) -> bool {
        *self == Self::ALL || self == required
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
