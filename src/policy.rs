//! The visibility predicate
//!
//! Single point of truth for category visibility. Every read path - the
//! category grid, popular pages, recent changes, the activity feed -
//! delegates here instead of re-implementing the condition. Hardcoded
//! category-name checks standing in for this predicate are exactly the
//! defect this module exists to prevent: they silently fail to generalize
//! to the next category marked restricted.
//!
//! Rules:
//! - No category (uncategorized item) -> visible
//! - Flag public or unset -> visible (unset must behave as public, for
//!   content created before the flag existed)
//! - Flag restricted -> visible only to privileged roles

use crate::error::{LatticeError, Result};
use crate::model::Category;
use crate::principal::Principal;
use std::collections::HashMap;

/// Decide whether content governed by `category` is visible to `principal`.
///
/// Pure and total: handles the missing-category case explicitly, never
/// panics, always returns a boolean.
pub fn is_visible(category: Option<&Category>, principal: &Principal) -> bool {
    let Some(category) = category else {
        // Uncategorized content has no category to hide it
        return true;
    };

    match category.is_public {
        Some(false) => principal.role.is_privileged(),
        // Some(true) and None (unset) both mean public
        _ => true,
    }
}

/// Test-time guard: verify every (item_id, category_id) pair in a result
/// set passes the predicate.
///
/// Returns `PolicyViolation` for the first offending item. Read paths never
/// call this on their own output in production; it exists so tests can
/// assert the cross-cutting invariant against any aggregator.
pub fn check_result_visibility(
    op: &str,
    pairs: &[(&str, Option<&str>)],
    categories: &HashMap<String, Category>,
    principal: &Principal,
) -> Result<()> {
    for (item_id, category_id) in pairs {
        let category = category_id.and_then(|id| categories.get(id));
        if !is_visible(category, principal) {
            return Err(LatticeError::PolicyViolation {
                op: op.to_string(),
                item_id: item_id.to_string(),
                role: principal.role,
            });
        }
    }
    Ok(())
}
