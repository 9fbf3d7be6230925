//! Principal roles for visibility decisions
//!
//! Roles form a strict ladder: `Anonymous < Member < Moderator < Admin`.
//! Restricted-category reads require `Moderator` or above; visibility
//! mutations require `Admin`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a requesting principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
#[derive(Default)]
pub enum Role {
    /// No authentication - public content only
    #[default]
    Anonymous = 0,
    /// Authenticated user
    Member = 1,
    /// Moderator - may read restricted categories
    Moderator = 2,
    /// Admin - full read access plus visibility mutations
    Admin = 3,
}

impl Role {
    /// Whether this role may see content in restricted categories
    pub fn is_privileged(self) -> bool {
        self >= Role::Moderator
    }

    /// Stable lowercase name, used in cache keys and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Member => "member",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The requester whose role gates access
///
/// Supplied per request by the session layer (out of scope here); never
/// read from ambient state, always passed explicitly so the policy
/// predicate stays pure and testable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal id, absent for anonymous requesters
    pub id: Option<String>,
    /// Role resolved by the session layer
    pub role: Role,
}

impl Principal {
    /// Anonymous requester
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::Anonymous,
        }
    }

    /// Identified principal with the given role
    pub fn with_role(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: Some(id.into()),
            role,
        }
    }
}
