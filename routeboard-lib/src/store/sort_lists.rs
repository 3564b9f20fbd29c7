use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    sort::SortEntry,
    store::{KvStore, Result},
};

/// Key under which a region's saved lists are stored.
pub fn storage_key(region: &str) -> String {
    format!("row-custom-sort-{region}")
}

/// A named snapshot of a whole working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSortList {
    pub id: String,
    /// Unique per region by convention only
    pub name: String,
    pub sort_config: Vec<SortEntry>,
    pub created_at: DateTime<Utc>,
}

impl SavedSortList {
    pub fn new(name: &str, sort_config: Vec<SortEntry>) -> Self {
        Self {
            id: format!("list-{}", Uuid::new_v4()),
            name: name.to_string(),
            sort_config,
            created_at: Utc::now(),
        }
    }
}

/// Loads and saves the saved sort lists of each region as JSON in a [`KvStore`].
#[derive(Debug, Clone)]
pub struct SortListStore<S> {
    store: S,
}

impl<S: KvStore> SortListStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All lists saved for `region`, oldest first.
    ///
    /// This never fails. Missing, unreadable or malformed data is logged and treated as no lists.
    pub fn load(&self, region: &str) -> Vec<SavedSortList> {
        let key = storage_key(region);

        let bytes = match self.store.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("Failed to read saved sort lists for '{region}': {err}");
                return Vec::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!("Ignoring malformed saved sort lists for '{region}': {err}");
            Vec::new()
        })
    }

    /// Replace every list saved for `region`.
    pub fn save(&self, region: &str, lists: &[SavedSortList]) -> Result<()> {
        let bytes = serde_json::to_vec(lists)?;
        self.store.set(&storage_key(region), &bytes)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        sort::SortEntry,
        store::{KvStore, MemoryStore, SavedSortList, SortListStore, storage_key},
    };

    #[test]
    fn test_load_missing_region() {
        let lists = SortListStore::new(MemoryStore::new());

        assert!(lists.load("selangor").is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let lists = SortListStore::new(MemoryStore::new());
        let morning = SavedSortList::new(
            "Morning run",
            vec![SortEntry::new("1-1", Some(2)), SortEntry::new("1-2", None)],
        );

        lists.save("kuala-lumpur", &[morning.clone()]).unwrap();

        assert_eq!(lists.load("kuala-lumpur"), vec![morning]);
        assert!(lists.load("selangor").is_empty());
    }

    #[test]
    fn test_malformed_data_loads_empty() {
        let store = MemoryStore::new();
        store.set(&storage_key("selangor"), b"{not json").unwrap();

        let lists = SortListStore::new(store);

        assert!(lists.load("selangor").is_empty());
    }

    #[test]
    fn test_reads_browser_format() {
        let store = MemoryStore::new();
        let json = r#"[{"id":"list-1700000000000","name":"Friday","sortConfig":[{"id":"2-3","customOrder":1},{"id":"2-1","customOrder":null}],"createdAt":"2024-03-15T02:30:00.000Z"}]"#;
        store.set(&storage_key("kuala-lumpur"), json.as_bytes()).unwrap();

        let loaded = SortListStore::new(store).load("kuala-lumpur");
        let list = loaded.first().unwrap();

        assert_eq!(list.name, "Friday");
        assert_eq!(
            list.sort_config,
            vec![SortEntry::new("2-3", Some(1)), SortEntry::new("2-1", None)]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let list = SavedSortList::new("Weekend", vec![SortEntry::new("5-1", Some(1))]);
        let value = serde_json::to_value(&list).unwrap();

        assert!(value.get("sortConfig").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(
            value.pointer("/sortConfig/0/customOrder"),
            Some(&serde_json::json!(1))
        );
    }
}
