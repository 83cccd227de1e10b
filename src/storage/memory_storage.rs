use crate::storage::{KeyValueStore, StorageError};
use dashmap::DashMap;
use std::sync::Arc;

/// Volatile store, mainly for tests and dry runs.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    cache: Arc<DashMap<String, String>>
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new())
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.cache.get(key).map(|value| value.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serves whatever it was seeded with and refuses every write.
#[derive(Clone, Default)]
pub struct ReadOnlyStorage {
    inner: MemoryStorage
}

impl ReadOnlyStorage {
    pub fn seeded(entries: &[(&str, &str)]) -> Result<Self, StorageError> {
        let inner = MemoryStorage::new();
        for (key, value) in entries {
            inner.set(key, value)?;
        }
        Ok(Self { inner })
    }
}

impl KeyValueStore for ReadOnlyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::io(key, std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store")))
    }
}
