//! Content-side data model
//!
//! Categories carry the tri-state visibility flag; content items reference
//! a category through a nullable foreign key; activity records reference
//! content items. All types are serde round-trippable because the result
//! cache stores serialized aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A content category with a tri-state visibility flag
///
/// `is_public = None` means the flag was never set and the category behaves
/// as public - content created before the flag existed must stay visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent category for hierarchy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Tri-state visibility: Some(true) public, Some(false) restricted,
    /// None unset (behaves as public)
    pub is_public: Option<bool>,
}

impl Category {
    /// Create a category with a generated id and the flag unset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id: None,
            is_public: None,
        }
    }

    /// Create with an explicit id (for fixtures and imports)
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            is_public: None,
        }
    }

    /// Set the visibility flag explicitly
    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    /// Whether the flag is explicitly restricted
    pub fn is_restricted(&self) -> bool {
        self.is_public == Some(false)
    }
}

/// Publication status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Published,
    Draft,
    Archived,
}

/// A content item (wiki page, library entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Opaque unique id
    pub id: String,
    /// Title
    pub title: String,
    /// Owning category; None means uncategorized, which is always visible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Publication status
    pub status: ContentStatus,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Lifetime view counter
    pub view_count: u64,
}

impl ContentItem {
    /// Create a published item with a generated id
    pub fn new(title: impl Into<String>, category_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            category_id,
            status: ContentStatus::Published,
            updated_at: Utc::now(),
            view_count: 0,
        }
    }

    /// Builder: explicit id (for fixtures)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: status
    pub fn status(mut self, status: ContentStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: view count
    pub fn views(mut self, views: u64) -> Self {
        self.view_count = views;
        self
    }

    /// Builder: update timestamp
    pub fn updated(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }
}

/// Kind of activity event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Created,
    Updated,
    Viewed,
}

/// An activity event referencing a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Opaque unique id
    pub id: String,
    /// What happened
    pub kind: ActivityKind,
    /// The item the event refers to
    pub item_id: String,
    /// Acting principal, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// When the event occurred
    pub occurred_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Create an event with a generated id, timestamped now
    pub fn new(kind: ActivityKind, item_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            item_id: item_id.into(),
            actor_id: None,
            occurred_at: Utc::now(),
        }
    }

    /// Builder: event timestamp
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// Builder: acting principal
    pub fn by(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }
}
