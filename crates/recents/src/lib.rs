//! Recently selected search results, newest first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of places remembered.
pub const MAX_RECENTS: usize = 4;

/// Storage key used by the browser store.
pub const DEFAULT_STORAGE_KEY: &str = "floodwatch.recent_searches";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl RecentSearch {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecentsError {
    #[error("browser storage unavailable")]
    StorageUnavailable,
    #[error("recent searches storage corrupt: {0}")]
    Corrupt(String),
    #[error("recent searches storage error: {0}")]
    Io(String),
}

pub trait RecentsStore {
    fn load(&self) -> Result<Vec<RecentSearch>, RecentsError>;
    fn save(&mut self, entries: &[RecentSearch]) -> Result<(), RecentsError>;
}

impl<S: RecentsStore + ?Sized> RecentsStore for Box<S> {
    fn load(&self) -> Result<Vec<RecentSearch>, RecentsError> {
        (**self).load()
    }

    fn save(&mut self, entries: &[RecentSearch]) -> Result<(), RecentsError> {
        (**self).save(entries)
    }
}

/// Puts `entry` first, drops any older entry with the same id, and caps the list.
pub fn push_recent(entries: &[RecentSearch], entry: RecentSearch) -> Vec<RecentSearch> {
    let mut out = Vec::with_capacity(MAX_RECENTS);
    let id = entry.id.clone();
    out.push(entry);
    out.extend(entries.iter().filter(|r| r.id != id).cloned());
    out.truncate(MAX_RECENTS);
    out
}

/// The recents list backed by a store.
///
/// Storage failures never lose the in-memory list; they are logged and
/// returned so the host can decide whether to surface them.
#[derive(Debug)]
pub struct RecentSearches<S> {
    store: S,
    entries: Vec<RecentSearch>,
}

impl<S: RecentsStore> RecentSearches<S> {
    pub fn open(store: S) -> Self {
        let entries = match store.load() {
            Ok(mut entries) => {
                entries.truncate(MAX_RECENTS);
                entries
            }
            Err(err) => {
                tracing::warn!(%err, "could not load recent searches");
                Vec::new()
            }
        };
        Self { store, entries }
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    pub fn record(&mut self, entry: RecentSearch) -> Result<(), RecentsError> {
        self.entries = push_recent(&self.entries, entry);
        self.store.save(&self.entries).inspect_err(|err| {
            tracing::warn!(%err, "could not persist recent searches");
        })
    }

    pub fn clear(&mut self) -> Result<(), RecentsError> {
        self.entries.clear();
        self.store.save(&self.entries)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecentsStore {
    raw: Option<String>,
}

impl InMemoryRecentsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a previously persisted JSON payload.
    pub fn from_json(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()) }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl RecentsStore for InMemoryRecentsStore {
    fn load(&self) -> Result<Vec<RecentSearch>, RecentsError> {
        decode(self.raw.as_deref())
    }

    fn save(&mut self, entries: &[RecentSearch]) -> Result<(), RecentsError> {
        self.raw = Some(encode(entries)?);
        Ok(())
    }
}

fn decode(raw: Option<&str>) -> Result<Vec<RecentSearch>, RecentsError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| RecentsError::Corrupt(e.to_string()))
}

fn encode(entries: &[RecentSearch]) -> Result<String, RecentsError> {
    serde_json::to_string(entries).map_err(|e| RecentsError::Io(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{RecentSearch, RecentsError, RecentsStore, decode, encode};

    #[derive(Debug)]
    pub struct LocalStorageRecentsStore {
        key: String,
    }

    impl LocalStorageRecentsStore {
        pub fn new(key: impl Into<String>) -> Result<Self, RecentsError> {
            window_local_storage()?;
            Ok(Self { key: key.into() })
        }
    }

    impl RecentsStore for LocalStorageRecentsStore {
        fn load(&self) -> Result<Vec<RecentSearch>, RecentsError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| RecentsError::Io(format!("get_item failed: {:?}", e)))?;
            decode(raw.as_deref())
        }

        fn save(&mut self, entries: &[RecentSearch]) -> Result<(), RecentsError> {
            let storage = window_local_storage()?;
            let raw = encode(entries)?;
            storage
                .set_item(&self.key, &raw)
                .map_err(|e| RecentsError::Io(format!("set_item failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, RecentsError> {
        let win = web_sys::window().ok_or(RecentsError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| RecentsError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(RecentsError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageRecentsStore;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn place(id: &str) -> RecentSearch {
        RecentSearch::new(id, format!("Place {id}"), 22.5, 88.3)
    }

    fn ids(entries: &[RecentSearch]) -> Vec<&str> {
        entries.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn newest_first_deduplicated_and_capped() {
        let mut list = Vec::new();
        for id in ["a", "b", "c", "d", "e"] {
            list = push_recent(&list, place(id));
        }
        assert_eq!(ids(&list), vec!["e", "d", "c", "b"]);

        list = push_recent(&list, place("c"));
        assert_eq!(ids(&list), vec!["c", "e", "d", "b"]);
    }

    #[test]
    fn record_persists_through_the_store() {
        let mut recents = RecentSearches::open(InMemoryRecentsStore::new());
        recents.record(place("kolkata")).unwrap();
        recents.record(place("howrah")).unwrap();

        let raw = recents.store.raw().unwrap().to_string();
        let reopened = RecentSearches::open(InMemoryRecentsStore::from_json(raw));
        assert_eq!(ids(reopened.entries()), vec!["howrah", "kolkata"]);
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let recents = RecentSearches::open(InMemoryRecentsStore::from_json("{not json"));
        assert!(recents.entries().is_empty());
    }

    #[cfg(target_arch = "wasm32")]
    #[test]
    fn native_local_storage_is_unavailable() {
        assert_eq!(
            LocalStorageRecentsStore::new(DEFAULT_STORAGE_KEY).unwrap_err(),
            RecentsError::StorageUnavailable
        );
    }
}
