//! In-memory [`Catalog`] with copy-on-write writes.
//!
//! Items live in an `Arc<Vec<_>>` behind `std::sync::RwLock`. Snapshots
//! clone the `Arc`; writes go through `Arc::make_mut`, which copies the
//! vector only while an older snapshot is still alive.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{AssistantError, Result};
use crate::models::AudioContent;

use super::{default_catalog, Catalog, CatalogSnapshot};

/// In-memory audio catalog.
pub struct InMemoryCatalog {
    items: RwLock<Arc<Vec<AudioContent>>>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<AudioContent>) -> Self {
        Self {
            items: RwLock::new(Arc::new(items)),
        }
    }

    /// Catalog seeded with the reference audio items.
    pub fn with_defaults() -> Self {
        Self::new(default_catalog())
    }

    fn poisoned() -> AssistantError {
        AssistantError::Backend("catalog lock poisoned".to_string())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(CatalogSnapshot::new(Arc::clone(&items)))
    }

    async fn set_favorite(&self, id: &str, favorite: bool) -> Result<AudioContent> {
        let mut guard = self.items.write().map_err(|_| Self::poisoned())?;
        let position = guard
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AssistantError::NotFound(format!("audio '{}'", id)))?;
        let items = Arc::make_mut(&mut *guard);
        items[position].is_favorite = favorite;
        Ok(items[position].clone())
    }
}
