//! Key-value persistence
//!
//! Backends:
//! - `LocalStorage`: browser LocalStorage (wasm32 only), survives reloads
//! - `MemoryStore`: in-process map for native runs and tests
//!
//! Values are opaque strings; callers serialize with serde_json.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named-slot string store
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` if the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Overwrite a slot
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete a slot (no-op if absent)
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::{KeyValueStore, StorageError};

    /// Browser LocalStorage
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        /// Open the window's LocalStorage
        pub fn open() -> Result<Self, StorageError> {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)?;
            Ok(Self { storage })
        }
    }

    fn js_err(e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Backend(format!("{:?}", e))
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage.get_item(key).map_err(js_err)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage.set_item(key, value).map_err(js_err)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage.remove_item(key).map_err(js_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("slot").unwrap().is_none());

        store.set("slot", "one").unwrap();
        store.set("slot", "two").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("two"));

        store.remove("slot").unwrap();
        assert!(store.get("slot").unwrap().is_none());
        // Removing again is fine
        store.remove("slot").unwrap();
    }

    #[test]
    fn test_store_through_mut_ref() {
        fn write_through(mut store: impl KeyValueStore) {
            store.set("k", "v").unwrap();
        }

        let mut store = MemoryStore::new();
        write_through(&mut store);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_boxed_store() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
