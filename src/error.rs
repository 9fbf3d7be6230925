//! Error taxonomy for the visibility core
//!
//! Not-found and authorization failures are typed so callers can
//! distinguish "no such category" from infrastructure failure and report
//! per-id outcomes in batch mutations. The visibility predicate itself
//! never errors - it is total over its inputs.

use crate::principal::Role;
use thiserror::Error;

/// Error types for catalog, aggregator and mutation operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// Category id does not exist
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Content item id does not exist
    #[error("content item not found: {0}")]
    ItemNotFound(String),

    /// Principal lacks the role required for the operation
    #[error("{action} requires {required}, principal has {actual}")]
    Forbidden {
        action: &'static str,
        required: Role,
        actual: Role,
    },

    /// A result set contained an item the visibility predicate rejects.
    /// Raised by the test-time guard, never by the read paths themselves.
    #[error("policy violation in {op}: item {item_id} is not visible to {role}")]
    PolicyViolation {
        op: String,
        item_id: String,
        role: Role,
    },

    /// Storage layer failure
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Crate-local result alias
pub type Result<T> = std::result::Result<T, LatticeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LatticeError::CategoryNotFound("archive".into());
        assert_eq!(err.to_string(), "category not found: archive");

        let err = LatticeError::Forbidden {
            action: "toggle_visibility",
            required: Role::Admin,
            actual: Role::Member,
        };
        assert!(err.to_string().contains("requires admin"));
        assert!(err.to_string().contains("has member"));
    }
}
