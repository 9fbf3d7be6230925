//! Content aggregators
//!
//! The three read paths over content items: popular pages, recent changes,
//! and the activity feed. All three share one filtering discipline - the
//! full ordered set runs through `policy::is_visible` first, the limit
//! applies afterwards. Truncating before filtering would under-fill pages
//! and, applied to a post-truncation slice, leak hidden items.
//!
//! Results are cached per role; see the cache module for invalidation.

use crate::cache::{AggregateCache, CacheKey};
use crate::catalog::CategoryDirectory;
use crate::error::Result;
use crate::model::{ActivityRecord, Category, ContentItem};
use crate::policy;
use crate::principal::Principal;
use crate::store::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const OP_POPULAR: &str = "get_popular_items";
const OP_RECENT: &str = "get_recent_items";
const OP_ACTIVITY: &str = "get_recent_activity";

/// Ranked, visibility-filtered views over content items
#[derive(Clone)]
pub struct ContentAggregator {
    store: Arc<dyn ContentStore>,
    directory: CategoryDirectory,
    cache: Arc<AggregateCache>,
}

impl ContentAggregator {
    /// Create an aggregator over the given store and cache
    pub fn new(
        store: Arc<dyn ContentStore>,
        directory: CategoryDirectory,
        cache: Arc<AggregateCache>,
    ) -> Self {
        Self {
            store,
            directory,
            cache,
        }
    }

    /// Published items by view count descending, visible to the principal
    pub async fn get_popular_items(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ContentItem>> {
        let key = Self::key(OP_POPULAR, limit, principal);
        // Capture the generation before touching the store: an invalidation
        // landing mid-read leaves the entry below stamped already stale
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.get::<Vec<ContentItem>>(&key) {
            return Ok(cached);
        }

        let ordered = self.store.list_published_by_views().await?;
        let result = self.filter_then_truncate(OP_POPULAR, ordered, limit, principal).await?;
        self.cache.insert(&key, &result, generation);
        Ok(result)
    }

    /// Published items by update time descending, visible to the principal
    pub async fn get_recent_items(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ContentItem>> {
        let key = Self::key(OP_RECENT, limit, principal);
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.get::<Vec<ContentItem>>(&key) {
            return Ok(cached);
        }

        let ordered = self.store.list_published_by_updated().await?;
        let result = self.filter_then_truncate(OP_RECENT, ordered, limit, principal).await?;
        self.cache.insert(&key, &result, generation);
        Ok(result)
    }

    /// Activity events by occurrence time descending, restricted to events
    /// whose referenced item is visible to the principal
    pub async fn get_recent_activity(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ActivityRecord>> {
        let key = Self::key(OP_ACTIVITY, limit, principal);
        let generation = self.cache.generation();
        if let Some(cached) = self.cache.get::<Vec<ActivityRecord>>(&key) {
            return Ok(cached);
        }

        let ordered = self.store.list_activity_by_time().await?;
        let categories = self.directory.visibility_index().await?;

        // Resolve each event's item to its category in one pass
        let items: HashMap<String, Option<String>> = self
            .store
            .list_items()
            .await?
            .into_iter()
            .map(|item| (item.id, item.category_id))
            .collect();

        let total = ordered.len();
        let mut result: Vec<ActivityRecord> = ordered
            .into_iter()
            .filter(|record| match items.get(&record.item_id) {
                Some(category_id) => {
                    let category = category_id.as_deref().and_then(|id| categories.get(id));
                    policy::is_visible(category, principal)
                }
                None => {
                    // Item deleted since the event; nothing to show
                    debug!(item_id = %record.item_id, "Dropping activity for missing item");
                    false
                }
            })
            .collect();
        result.truncate(limit);

        debug!(
            op = OP_ACTIVITY,
            role = %principal.role,
            total = total,
            returned = result.len(),
            "Activity feed filtered"
        );
        self.cache.insert(&key, &result, generation);
        Ok(result)
    }

    /// Shared discipline for the item-returning paths: run the full ordered
    /// set through the predicate, then truncate
    async fn filter_then_truncate(
        &self,
        op: &'static str,
        ordered: Vec<ContentItem>,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ContentItem>> {
        let categories = self.directory.visibility_index().await?;
        let total = ordered.len();

        let mut visible: Vec<ContentItem> = ordered
            .into_iter()
            .filter(|item| Self::item_visible(item, &categories, principal))
            .collect();
        visible.truncate(limit);

        debug!(
            op = op,
            role = %principal.role,
            total = total,
            returned = visible.len(),
            "Aggregate filtered"
        );
        Ok(visible)
    }

    /// Resolve the item's category and delegate to the shared predicate
    fn item_visible(
        item: &ContentItem,
        categories: &HashMap<String, Category>,
        principal: &Principal,
    ) -> bool {
        let category = item.category_id.as_deref().and_then(|id| categories.get(id));
        policy::is_visible(category, principal)
    }

    fn key(op: &str, limit: usize, principal: &Principal) -> CacheKey {
        CacheKey::new(op, principal.role, &format!("{{\"limit\":{limit}}}"))
    }
}
