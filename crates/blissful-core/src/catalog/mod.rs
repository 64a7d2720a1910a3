//! Audio catalog abstraction.
//!
//! The [`Catalog`] trait is the single owner of the audio item list. The
//! application layer mutates it (favorites); assistants only ever read an
//! immutable [`CatalogSnapshot`] taken at the start of a call, so a toggle
//! that lands mid-call cannot change what that call sees.
//!
//! ```text
//! ┌──────────────┐  set_favorite   ┌─────────────────┐
//! │  App layer   │────────────────▶│ InMemoryCatalog │
//! └──────────────┘                 │  RwLock<Arc<_>> │
//!                                  └────────┬────────┘
//!                                   snapshot│ (Arc clone)
//!                                           ▼
//!                                  ┌─────────────────┐
//!                                  │    Assistant    │
//!                                  └─────────────────┘
//! ```

pub mod defaults;
pub mod memory;

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::AudioContent;

pub use defaults::default_catalog;
pub use memory::InMemoryCatalog;

/// Category label that matches every item.
pub const ALL_CATEGORIES: &str = "All";

/// Immutable view of the catalog at a point in time.
///
/// Cloning is an `Arc` bump; the underlying items are never mutated.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    items: Arc<Vec<AudioContent>>,
}

impl CatalogSnapshot {
    pub fn new(items: Arc<Vec<AudioContent>>) -> Self {
        Self { items }
    }

    /// Items whose category equals `category`, or all items for `"All"`.
    pub fn by_category(&self, category: &str) -> Vec<&AudioContent> {
        self.items
            .iter()
            .filter(|item| category == ALL_CATEGORIES || item.category == category)
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&AudioContent> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl Deref for CatalogSnapshot {
    type Target = [AudioContent];

    fn deref(&self) -> &[AudioContent] {
        &self.items
    }
}

/// Storage backend for audio content.
///
/// Implementations must be `Send + Sync` so a single store can be shared
/// by the application and any number of concurrent assistant calls.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Take a read-only snapshot of every item, in catalog order.
    async fn snapshot(&self) -> Result<CatalogSnapshot>;

    /// Look up a single item by id.
    async fn get(&self, id: &str) -> Result<Option<AudioContent>> {
        Ok(self.snapshot().await?.find(id).cloned())
    }

    /// Set the favorite flag on an item, returning the updated item.
    ///
    /// Fails with `NotFound` for an unknown id.
    async fn set_favorite(&self, id: &str, favorite: bool) -> Result<AudioContent>;

    /// All items currently marked favorite.
    async fn favorites(&self) -> Result<Vec<AudioContent>> {
        Ok(self
            .snapshot()
            .await?
            .iter()
            .filter(|item| item.is_favorite)
            .cloned()
            .collect())
    }
}
