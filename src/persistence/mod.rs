//! Key-value persistence for settings and progress
//!
//! Stores are opaque string maps. Values are JSON; anything unreadable falls
//! back to defaults instead of failing the caller.

#[cfg(target_arch = "wasm32")]
pub mod local_storage;
pub mod progress;

use std::collections::HashMap;

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;
pub use progress::Progress;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage backend rejected the operation: {0}")]
    Backend(String),
    #[error("invalid stored value")]
    Json(#[from] serde_json::Error),
}

/// Minimal string store (LocalStorage on the web, a map elsewhere)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read and decode a JSON value; missing, unreadable or corrupt entries give
/// `None`
pub fn load_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("failed to read {}: {}", key, err);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("discarding corrupt {}: {}", key, err);
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: serde::Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_corrupt_json_is_ignored() {
        let mut store = MemoryStore::new();
        store.set("numbers", "{not json").unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "numbers"), None);
        save_json(&mut store, "numbers", &vec![1u32, 2]).unwrap();
        assert_eq!(load_json::<Vec<u32>>(&store, "numbers"), Some(vec![1, 2]));
    }
}
