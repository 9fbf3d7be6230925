//! Visibility service facade
//!
//! Wires the store, category directory, aggregators and result cache, and
//! owns the one write path that changes visibility. Invalidation is a
//! blocking step on the mutation's success path: by the time the caller
//! sees a success, the next aggregator call recomputes from current state.

use crate::aggregate::ContentAggregator;
use crate::cache::AggregateCache;
use crate::catalog::CategoryDirectory;
use crate::config::VisibilityConfig;
use crate::error::{LatticeError, Result};
use crate::model::{ActivityRecord, Category, ContentItem};
use crate::principal::{Principal, Role};
use crate::store::{ContentStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Per-id outcome of a visibility toggle batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// The category id this outcome refers to
    pub category_id: String,
    /// What happened to it
    pub status: ToggleStatus,
}

/// Result of toggling a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToggleStatus {
    /// Flag applied; carries the updated category
    Updated(Category),
    /// No category with this id
    NotFound,
}

/// Facade over the visibility core
#[derive(Clone)]
pub struct VisibilityService {
    store: Arc<dyn ContentStore>,
    directory: CategoryDirectory,
    aggregator: ContentAggregator,
    cache: Arc<AggregateCache>,
}

impl VisibilityService {
    /// Create a service over the given store
    pub fn new(store: Arc<dyn ContentStore>, config: VisibilityConfig) -> Self {
        let directory = CategoryDirectory::new(store.clone());
        let cache = Arc::new(AggregateCache::new(&config));
        let aggregator = ContentAggregator::new(store.clone(), directory.clone(), cache.clone());
        Self {
            store,
            directory,
            aggregator,
            cache,
        }
    }

    /// Create a service over a fresh in-memory store
    pub fn in_memory(config: VisibilityConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// The result cache, for stats inspection and sweeper wiring
    pub fn cache(&self) -> &Arc<AggregateCache> {
        &self.cache
    }

    /// The category directory
    pub fn directory(&self) -> &CategoryDirectory {
        &self.directory
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    /// Categories visible to the principal
    pub async fn get_all_categories(&self, principal: &Principal) -> Result<Vec<Category>> {
        self.directory.get_all_categories(principal).await
    }

    /// Category by id
    pub async fn get_category_by_id(&self, id: &str) -> Result<Category> {
        self.directory.get_category_by_id(id).await
    }

    /// Popular items visible to the principal
    pub async fn get_popular_items(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ContentItem>> {
        self.aggregator.get_popular_items(limit, principal).await
    }

    /// Recently changed items visible to the principal
    pub async fn get_recent_items(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ContentItem>> {
        self.aggregator.get_recent_items(limit, principal).await
    }

    /// Recent activity on items visible to the principal
    pub async fn get_recent_activity(
        &self,
        limit: usize,
        principal: &Principal,
    ) -> Result<Vec<ActivityRecord>> {
        self.aggregator.get_recent_activity(limit, principal).await
    }

    // ========================================================================
    // Write paths
    // ========================================================================

    /// Toggle the visibility flag on a batch of categories. Admin only.
    ///
    /// Missing ids become per-id `NotFound` outcomes rather than aborting
    /// the batch. After at least one successful update the aggregate cache
    /// is invalidated synchronously, before this call returns.
    pub async fn toggle_visibility(
        &self,
        category_ids: &[String],
        is_public: bool,
        principal: &Principal,
    ) -> Result<Vec<ToggleOutcome>> {
        require_role("toggle_visibility", Role::Admin, principal)?;

        let mut outcomes = Vec::with_capacity(category_ids.len());
        let mut updated = 0usize;

        for id in category_ids {
            let status = match self.directory.set_visibility(id, is_public).await {
                Ok(category) => {
                    updated += 1;
                    ToggleStatus::Updated(category)
                }
                Err(LatticeError::CategoryNotFound(_)) => {
                    warn!(category_id = %id, "Toggle target not found");
                    ToggleStatus::NotFound
                }
                Err(other) => return Err(other),
            };
            outcomes.push(ToggleOutcome {
                category_id: id.clone(),
                status,
            });
        }

        if updated > 0 {
            // Blocking invalidation: success implies the next read recomputes
            self.cache.invalidate_all();
            info!(
                updated = updated,
                missing = outcomes.len() - updated,
                is_public = is_public,
                "Category visibility toggled"
            );
        }

        Ok(outcomes)
    }

    /// Create a category with the flag unset (public). Admin only.
    pub async fn create_category(
        &self,
        name: impl Into<String>,
        parent_id: Option<String>,
        principal: &Principal,
    ) -> Result<Category> {
        require_role("create_category", Role::Admin, principal)?;

        let mut category = Category::new(name);
        category.parent_id = parent_id;
        self.store.put_category(category.clone()).await?;
        self.cache.invalidate_all();
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Insert or replace a content item, invalidating cached aggregates
    pub async fn put_item(&self, item: ContentItem) -> Result<()> {
        self.store.put_item(item).await?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Append an activity event, invalidating cached aggregates
    pub async fn record_activity(&self, record: ActivityRecord) -> Result<()> {
        self.store.record_activity(record).await?;
        self.cache.invalidate_all();
        Ok(())
    }
}

/// Reject principals below the required role with a typed error
fn require_role(action: &'static str, required: Role, principal: &Principal) -> Result<()> {
    if principal.role >= required {
        Ok(())
    } else {
        warn!(
            action = action,
            required = %required,
            actual = %principal.role,
            "Operation rejected"
        );
        Err(LatticeError::Forbidden {
            action,
            required,
            actual: principal.role,
        })
    }
}
