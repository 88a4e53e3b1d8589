//! Item storage module
//!
//! Defines the `Item` record and the `ItemStore` contract shared by the
//! in-memory and SQLite backends. Handlers only ever see `dyn ItemStore`.

mod memory;
mod sqlite;

pub use memory::MemoryItemStore;
pub use sqlite::SqliteItemStore;

use serde::{Deserialize, Serialize};

use crate::config::{StorageBackend, StorageConfig};

/// A stored item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Validated, trimmed client-supplied fields of an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
}

impl ItemFields {
    pub fn into_item(self, id: i64) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
        }
    }
}

/// Storage failures. All of them surface to clients as a 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store has been disposed")]
    Disposed,
}

/// Persistence contract for items.
///
/// Ids are assigned by the store, increase monotonically and are never
/// reused after deletion, except that `reset_all` restarts them at 1.
pub trait ItemStore: Send + Sync {
    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;

    /// All items in creation order
    fn list_all(&self) -> Result<Vec<Item>, StoreError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Item>, StoreError>;

    /// Persist a new item under the next id
    fn insert(&self, fields: ItemFields) -> Result<Item, StoreError>;

    /// Replace name and description; `None` if no such item
    fn update(&self, id: i64, fields: ItemFields) -> Result<Option<Item>, StoreError>;

    /// Remove an item and hand it back; `None` if no such item
    fn delete_by_id(&self, id: i64) -> Result<Option<Item>, StoreError>;

    /// Drop every item and restart id assignment at 1
    fn reset_all(&self) -> Result<(), StoreError>;

    /// Release backing resources. Every later call fails with `Disposed`.
    fn dispose(&self) -> Result<(), StoreError>;
}

/// Open the backend selected in configuration
pub fn open(config: &StorageConfig) -> Result<Box<dyn ItemStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryItemStore::new())),
        StorageBackend::Sqlite => Ok(Box::new(SqliteItemStore::open(&config.sqlite_path)?)),
    }
}
