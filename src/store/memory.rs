//! In-memory reference store
//!
//! Thread-safe over DashMap; reads take no global lock and the visibility
//! flag update is atomic per entry via the map's entry guard.

use crate::error::Result;
use crate::model::{ActivityRecord, Category, ContentItem, ContentStatus};
use crate::store::ContentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

/// DashMap-backed store, suitable for tests and single-node deployments
#[derive(Default)]
pub struct MemoryStore {
    categories: DashMap<String, Category>,
    items: DashMap<String, ContentItem>,
    activity: DashMap<String, ActivityRecord>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn published_items(&self) -> Vec<ContentItem> {
        self.items
            .iter()
            .filter(|entry| entry.status == ContentStatus::Published)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.categories.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Stable listing order for callers that render directly
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn put_category(&self, category: Category) -> Result<()> {
        debug!(category_id = %category.id, "Category stored");
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    async fn set_category_visibility(
        &self,
        id: &str,
        is_public: bool,
    ) -> Result<Option<Category>> {
        // get_mut holds the shard guard, so the flag write is atomic
        // per entry; last writer wins on concurrent toggles of one id
        match self.categories.get_mut(id) {
            Some(mut entry) => {
                entry.is_public = Some(is_public);
                Ok(Some(entry.value().clone()))
            }
            None => Ok(None),
        }
    }

    async fn get_item(&self, id: &str) -> Result<Option<ContentItem>> {
        Ok(self.items.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_items(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn put_item(&self, item: ContentItem) -> Result<()> {
        debug!(item_id = %item.id, "Content item stored");
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn list_published_by_views(&self) -> Result<Vec<ContentItem>> {
        let mut items = self.published_items();
        items.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn list_published_by_updated(&self) -> Result<Vec<ContentItem>> {
        let mut items = self.published_items();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn record_activity(&self, record: ActivityRecord) -> Result<()> {
        self.activity.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list_activity_by_time(&self) -> Result<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .activity
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}
