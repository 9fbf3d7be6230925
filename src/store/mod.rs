//! Storage seam for categories, content items and activity
//!
//! The persistence engine is out of scope for this crate; the trait only
//! demands what the read paths and the toggle mutation need - point lookup
//! by id, ordered scans, and an atomic single-entry flag update.
//! `MemoryStore` is the reference implementation.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::{ActivityRecord, Category, ContentItem};
use async_trait::async_trait;

/// Backing store for the category directory and the aggregators
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Point lookup of a category
    async fn get_category(&self, id: &str) -> Result<Option<Category>>;

    /// All categories, unfiltered (policy is applied by the directory)
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Insert or replace a category
    async fn put_category(&self, category: Category) -> Result<()>;

    /// Atomically set a category's visibility flag.
    ///
    /// Returns the updated category, or None when the id does not exist.
    /// Concurrent updates of the same id are last-writer-wins.
    async fn set_category_visibility(&self, id: &str, is_public: bool)
        -> Result<Option<Category>>;

    /// Point lookup of a content item
    async fn get_item(&self, id: &str) -> Result<Option<ContentItem>>;

    /// All content items, unordered
    async fn list_items(&self) -> Result<Vec<ContentItem>>;

    /// Insert or replace a content item
    async fn put_item(&self, item: ContentItem) -> Result<()>;

    /// Published items ordered by view count, descending
    async fn list_published_by_views(&self) -> Result<Vec<ContentItem>>;

    /// Published items ordered by update timestamp, descending
    async fn list_published_by_updated(&self) -> Result<Vec<ContentItem>>;

    /// Append an activity event
    async fn record_activity(&self, record: ActivityRecord) -> Result<()>;

    /// Activity events ordered by occurrence timestamp, descending
    async fn list_activity_by_time(&self) -> Result<Vec<ActivityRecord>>;
}
