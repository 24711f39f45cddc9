//! In-memory backend implementation using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::BackendError;

use super::CacheBackend;
use super::CachedValue;

/// An in-process backend backed by a concurrent hash map.
///
/// This is the default backend. It's fast and thread-safe, but entries
/// are lost when the process exits and are not shared across processes.
///
/// # Example
///
/// ```
/// use statement_cache::store::InMemoryBackend;
///
/// let backend = InMemoryBackend::new();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    store: DashMap<String, CachedValue>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Creates a new in-memory backend with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries (including expired ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, BackendError> {
        let Some(entry) = self.store.get(key) else {
            return Ok(None);
        };
        let value = entry.value();

        if value.is_expired() {
            drop(entry);
            self.store.remove(key);
            Ok(None)
        } else {
            Ok(Some(value.clone()))
        }
    }

    async fn set(&self, key: &str, value: CachedValue) -> Result<(), BackendError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.store.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), BackendError> {
        for key in keys {
            self.store.remove(key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.store.clear();
        Ok(())
    }

    async fn gc(&self) -> Result<usize, BackendError> {
        let mut removed = 0;
        self.store.retain(|_, value| {
            if value.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
