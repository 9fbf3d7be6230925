//! Lattice Core - category visibility and content aggregation
//!
//! The authorization core for the Lattice wiki platform. Every read path
//! that lists or aggregates content items (category grid, popular pages,
//! recent changes, activity feed) must apply one shared visibility rule:
//! items in a restricted category are invisible to unprivileged principals
//! everywhere, while moderators and admins see everything.
//!
//! ## Components
//!
//! - **Policy**: the pure visibility predicate, single point of truth
//! - **Catalog**: category directory with principal-filtered listing
//! - **Aggregate**: popular / recent / activity read paths sharing the predicate
//! - **Cache**: TTL + generation-based result cache with coarse invalidation
//! - **Service**: facade wiring the above, including the admin-only
//!   visibility toggle that invalidates synchronously

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod policy;
pub mod principal;
pub mod service;
pub mod store;

pub use config::VisibilityConfig;
pub use error::{LatticeError, Result};
pub use model::{ActivityKind, ActivityRecord, Category, ContentItem, ContentStatus};
pub use principal::{Principal, Role};
pub use service::{ToggleOutcome, ToggleStatus, VisibilityService};
