//! Category directory
//!
//! Authoritative lookup of categories and their visibility flags. The
//! principal-filtered listing here is the reference behavior every
//! aggregator must match: filter through `policy::is_visible`, nothing else.

use crate::error::{LatticeError, Result};
use crate::model::Category;
use crate::policy;
use crate::principal::Principal;
use crate::store::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Directory over the category store
#[derive(Clone)]
pub struct CategoryDirectory {
    store: Arc<dyn ContentStore>,
}

impl CategoryDirectory {
    /// Create a directory over the given store
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// All categories visible to the principal, in listing order
    pub async fn get_all_categories(&self, principal: &Principal) -> Result<Vec<Category>> {
        let all = self.store.list_categories().await?;
        let total = all.len();
        let visible: Vec<Category> = all
            .into_iter()
            .filter(|category| policy::is_visible(Some(category), principal))
            .collect();

        debug!(
            role = %principal.role,
            total = total,
            visible = visible.len(),
            "Category listing filtered"
        );
        Ok(visible)
    }

    /// Category by id; typed not-found error on miss
    pub async fn get_category_by_id(&self, id: &str) -> Result<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| LatticeError::CategoryNotFound(id.to_string()))
    }

    /// Set a category's visibility flag; typed not-found error on miss.
    ///
    /// Callers that mutate through this path own cache invalidation - see
    /// `VisibilityService::toggle_visibility`.
    pub async fn set_visibility(&self, id: &str, is_public: bool) -> Result<Category> {
        self.store
            .set_category_visibility(id, is_public)
            .await?
            .ok_or_else(|| LatticeError::CategoryNotFound(id.to_string()))
    }

    /// Id -> Category map for resolving item categories in one pass
    pub async fn visibility_index(&self) -> Result<HashMap<String, Category>> {
        let categories = self.store.list_categories().await?;
        Ok(categories
            .into_iter()
            .map(|category| (category.id.clone(), category))
            .collect())
    }
}
