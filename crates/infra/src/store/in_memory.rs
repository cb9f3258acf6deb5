use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockrecon_core::ItemId;
use stockrecon_inventory::Item;

use super::{ItemStore, StoreError};

/// In-memory item store for tests/dev.
///
/// The compare-and-set runs under the write lock, so it is atomic with respect
/// to every other writer.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace an item. Stands in for the catalog in tests and dev runs.
    pub fn insert(&self, item: Item) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        items.insert(item.id(), item);
        Ok(())
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|i| (i.id(), i)).collect()),
        }
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(items.get(&id).cloned())
    }

    async fn compare_and_set_quantity(
        &self,
        id: ItemId,
        expected: i64,
        new: i64,
        at: DateTime<Utc>,
        require_active: bool,
    ) -> Result<bool, StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let Some(item) = items.get_mut(&id) else {
            return Ok(false);
        };
        if item.quantity() != expected || (require_active && !item.is_active()) {
            return Ok(false);
        }
        item.set_quantity(new, at)
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let mut all: Vec<Item> = items.values().cloned().collect();
        all.sort_by_key(|i| i.id());
        Ok(all)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.items
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}
