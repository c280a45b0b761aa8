//! In-process store

use super::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Store backed by a map in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("auth").unwrap(), None);

        store.set_item("auth", "value").unwrap();
        assert_eq!(store.get_item("auth").unwrap().as_deref(), Some("value"));

        store.remove_item("auth").unwrap();
        assert_eq!(store.get_item("auth").unwrap(), None);

        // Removing twice is fine
        store.remove_item("auth").unwrap();
    }

    #[test]
    fn test_with_items() {
        let store = MemoryStore::with_items([("theme", "dark")]);
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));
    }
}
