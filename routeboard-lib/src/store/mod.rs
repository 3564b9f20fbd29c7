//! Key-value persistence for saved sort lists.
//!
//! [`KvStore`] is the capability the rest of the crate depends on. [`MemoryStore`] keeps values in
//! a map and is used in tests, [`DbStore`] keeps them in the repository database on disk.
//! [`SortListStore`] layers the saved list format on top of either.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use thiserror::Error;

mod db;
mod sort_lists;

pub use db::DbStore;
pub use sort_lists::{SavedSortList, SortListStore, storage_key};

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a store can fail, translated once at the store boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage backend failed: {0}")]
    Backend(#[from] agdb::DbError),
    #[error("Stored value for '{0}' is not a byte string")]
    Corrupt(String),
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal byte oriented key-value storage.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// A [`KvStore`] that lives only as long as the process. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{KvStore, MemoryStore};

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("key", b"one").unwrap();
        store.set("key", b"two").unwrap();

        let shared = store.clone();
        assert_eq!(shared.get("key").unwrap(), Some(b"two".to_vec()));
    }
}
