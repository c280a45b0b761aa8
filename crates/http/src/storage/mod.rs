//! Persisted key-value storage with local-storage semantics
//!
//! Keys and values are plain strings. The client only ever reads from a
//! store; writing the login record is the job of whoever owns the store.

mod file;
mod memory;
mod token;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(test)]
pub use token::MockTokenSource;
pub use token::{
    AUTH_STORAGE_KEY, AuthRecord, MalformedAuthPolicy, StaticToken, StoredAuthToken, TokenError,
    TokenSource,
};

use std::sync::Arc;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file exists but is not a JSON object of strings
    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// Storage cannot be reached in this environment
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed, string-valued persisted store
pub trait KeyValueStore: Send + Sync {
    /// Look up a value; `Ok(None)` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}
