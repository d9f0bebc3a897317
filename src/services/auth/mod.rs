pub mod policy;
pub mod revocation;
pub mod token_service;

pub use revocation::RevocationStore;
pub use token_service::{TokenError, TokenService};

use serde::{Deserialize, Serialize};

/// Closed role set. The claim value on the wire is the uppercase name
/// ("USER" / "ADMIN"); anything else fails token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
