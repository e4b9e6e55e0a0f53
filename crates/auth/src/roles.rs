use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role attached to a caller by the identity provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Borrows items: fills a cart, submits loans, edits pending dates.
    Requester,
    /// Runs the approval workflow and manages the catalogue.
    Approver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Approver => "approver",
        }
    }

    pub fn is_approver(&self) -> bool {
        matches!(self, Role::Approver)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requester" | "user" => Ok(Role::Requester),
            "approver" | "admin" => Ok(Role::Approver),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
