//! Pluggable cache backend contract

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::BackendError;

/// A serialized value stored by a backend, with expiry metadata.
#[derive(Debug, Clone)]
pub struct CachedValue {
    /// The cached entry, serialized as bytes (via bincode).
    pub data: Vec<u8>,
    /// When this value was cached.
    pub created_at: DateTime<Utc>,
    /// When this value expires and must no longer be returned.
    pub expires_at: DateTime<Utc>,
}

impl CachedValue {
    /// Creates a new cached value.
    pub fn new(data: Vec<u8>, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            data,
            created_at,
            expires_at,
        }
    }

    /// Creates a new cached value with the current time as `created_at`.
    pub fn new_now(data: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            expires_at,
        }
    }

    /// Returns `true` if this cached value has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Trait for physical cache backends.
///
/// The cache store is written against this narrow contract so any
/// key-value store, in-process or distributed, can back it.
/// Implementations are responsible for:
/// - Never returning expired values from `get()`
/// - Storing values with their expiration metadata
/// - Reporting infrastructure failures as [`BackendError`], never as
///   silent misses
///
/// # Example
///
/// ```ignore
/// use statement_cache::store::{CacheBackend, CachedValue, InMemoryBackend};
/// use std::time::Duration;
///
/// let backend = InMemoryBackend::new();
/// let value = CachedValue::new_now(b"hello".to_vec(), expires_at);
/// backend.set("my-key", value).await?;
///
/// if let Some(cached) = backend.get("my-key").await? {
///     println!("Got: {:?}", cached.data);
/// }
/// ```
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Retrieves a cached value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist or the value has
    /// expired. Implementations must never return expired values.
    async fn get(&self, key: &str) -> Result<Option<CachedValue>, BackendError>;

    /// Stores a value under a key.
    async fn set(&self, key: &str, value: CachedValue) -> Result<(), BackendError>;

    /// Removes a value by key. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Removes all the given keys as one bulk operation.
    async fn remove_many(&self, keys: &[String]) -> Result<(), BackendError>;

    /// Clears all values.
    async fn clear(&self) -> Result<(), BackendError>;

    /// Removes all expired values, returning the number removed.
    async fn gc(&self) -> Result<usize, BackendError>;
}
