//! Durable string-keyed storage and the favorites list kept in it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::state::FavoriteRecord;

pub const FAVORITES_KEY: &str = "favorites";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object in a single file, rewritten in full on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "store file corrupted, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("Failed to create store directory: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(&next)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::Io(format!("Failed to write store file: {}", e)))?;
        self.values = next;
        Ok(())
    }
}

/// Reads the favorites list, treating missing or corrupt data as empty.
pub fn load_favorites(store: &dyn KeyValueStore) -> Vec<FavoriteRecord> {
    let Some(json) = store.get(FAVORITES_KEY) else {
        return Vec::new();
    };
    serde_json::from_str(&json).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "favorites corrupted, starting empty");
        Vec::new()
    })
}

pub fn save_favorites(
    store: &mut dyn KeyValueStore,
    favorites: &[FavoriteRecord],
) -> Result<(), StoreError> {
    let json = serde_json::to_string(favorites).map_err(|e| StoreError::Serialize(e.to_string()))?;
    store.set(FAVORITES_KEY, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn favorite(id: &str, category: &str) -> FavoriteRecord {
        FavoriteRecord {
            id: id.to_string(),
            name: format!("entry-{id}"),
            category: category.to_string(),
            sprite_url: None,
        }
    }

    #[test]
    fn test_favorites_round_trip_through_memory_store() {
        let mut store = MemoryStore::new();
        let favorites = vec![favorite("25", "pokemon"), favorite("3", "type")];

        save_favorites(&mut store, &favorites).unwrap();

        assert_eq!(load_favorites(&store), favorites);
    }

    #[test]
    fn test_missing_or_corrupt_favorites_load_empty() {
        let mut store = MemoryStore::new();
        assert!(load_favorites(&store).is_empty());

        store.set(FAVORITES_KEY, "{not json".to_string()).unwrap();
        assert!(load_favorites(&store).is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("pokedex-store-{}", std::process::id()));
        let path = dir.join("store.json");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path);
        save_favorites(&mut store, &[favorite("1", "version")]).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(load_favorites(&reopened), vec![favorite("1", "version")]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
