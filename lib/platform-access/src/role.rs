//! Role type for platform access control.
//!
//! Every user who completes the identity-provider handshake is granted
//! `Admin`. `User` exists so credentials minted elsewhere (or by tests) can
//! carry a lesser role and be turned away by admin-gated routes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role embedded in a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standard user.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
