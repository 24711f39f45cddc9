//! Concurrent cache store with dependency-indexed invalidation
//!
//! The store is the authority for invalidation. It keeps a reverse
//! dependency index (dependency identifier → set of key hashes) next to
//! the pluggable byte backend, and maintains the invariant that every
//! hash reachable from the index corresponds to a live entry.

mod backend;
mod memory;

pub use backend::*;
pub use memory::*;

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::model::CachedEntry;
use crate::policy::CachePolicy;
use crate::policy::ExpirationMode;

/// What the backend actually stores: the entry plus the sliding TTL, so a
/// hit can push the deadline out without consulting the original policy.
#[derive(Serialize, Deserialize)]
struct Envelope {
    entry: CachedEntry,
    sliding_secs: Option<u64>,
}

/// Concurrent key→entry store with atomic fan-out invalidation.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across tasks.
/// All index mutations happen inside one coarse critical section, which
/// serializes insert/invalidate races: an invalidation that happens-after
/// an insert always wins, and an insert racing an in-flight invalidation
/// on an overlapping dependency cannot revive a removed entry.
///
/// # Example
///
/// ```ignore
/// use statement_cache::store::CacheStore;
///
/// let store = CacheStore::in_memory();
/// store.insert(&key, entry, &policy).await?;
/// let cached = store.get(&key).await?;
/// ```
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<CacheStoreInner>,
}

struct CacheStoreInner {
    backend: Arc<dyn CacheBackend>,
    index: Mutex<HashMap<String, HashSet<String>>>,
}

impl CacheStore {
    /// Creates a store over the given backend.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            inner: Arc::new(CacheStoreInner {
                backend,
                index: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a store over a fresh [`InMemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    /// Looks up a cached entry by key hash.
    ///
    /// Expired entries count as misses (the backend evicts them lazily).
    /// A hit on a sliding entry pushes its deadline out. Backend failures
    /// propagate as errors rather than misses.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<CachedEntry>, CacheError> {
        let Some(value) = self.inner.backend.get(&key.hash).await? else {
            // the entry may have expired out from under its index
            // registrations; drop them so the index never outlives entries
            let mut index = self.inner.index.lock().await;
            purge_hashes(&mut index, &HashSet::from([key.hash.clone()]));
            debug!(key = %key.hash, "cache miss");
            return Ok(None);
        };

        let envelope: Envelope = bincode::deserialize(&value.data)?;

        if let Some(secs) = envelope.sliding_secs {
            // re-arm under the index lock, re-checking presence, so a
            // concurrent invalidation cannot be undone by this set
            let index = self.inner.index.lock().await;
            if self.inner.backend.get(&key.hash).await?.is_some() {
                let refreshed = CachedValue::new(
                    value.data,
                    value.created_at,
                    Utc::now() + chrono::Duration::seconds(secs as i64),
                );
                self.inner.backend.set(&key.hash, refreshed).await?;
            }
            drop(index);
        }

        debug!(key = %key.hash, "cache hit");
        Ok(Some(envelope.entry))
    }

    /// Stores an entry under the key's hash and registers the hash in the
    /// reverse index for every dependency of the key.
    ///
    /// Entries inserted under [`ExpirationMode::NeverRemove`] skip index
    /// registration and therefore survive dependency invalidation.
    pub async fn insert(
        &self,
        key: &CacheKey,
        entry: CachedEntry,
        policy: &CachePolicy,
    ) -> Result<(), CacheError> {
        let envelope = Envelope {
            entry,
            sliding_secs: (policy.mode == ExpirationMode::Sliding)
                .then(|| policy.duration.as_secs()),
        };
        let data = bincode::serialize(&envelope)?;
        let now = Utc::now();
        let value = CachedValue::new(data, now, policy.deadline_from(now));

        // backend write and index registration form one critical section
        let mut index = self.inner.index.lock().await;
        self.inner.backend.set(&key.hash, value).await?;
        if policy.mode != ExpirationMode::NeverRemove {
            for dependency in &key.dependencies {
                index
                    .entry(dependency.clone())
                    .or_default()
                    .insert(key.hash.clone());
            }
        }
        drop(index);

        debug!(key = %key.hash, "inserted cache entry");
        Ok(())
    }

    /// Removes every entry registered under any of the given dependencies
    /// and scrubs the removed hashes from all index buckets.
    ///
    /// Returns whether anything was removed. Invalidating dependencies
    /// with no registered entries is a no-op returning `false`.
    pub async fn invalidate(&self, dependencies: &BTreeSet<String>) -> Result<bool, CacheError> {
        let mut index = self.inner.index.lock().await;

        let mut doomed: HashSet<String> = HashSet::new();
        for dependency in dependencies {
            if let Some(hashes) = index.get(dependency) {
                doomed.extend(hashes.iter().cloned());
            }
        }
        if doomed.is_empty() {
            return Ok(false);
        }

        let keys: Vec<String> = doomed.iter().cloned().collect();
        let removal = self.inner.backend.remove_many(&keys).await;
        // scrub from every bucket, not just the triggering dependencies,
        // so no orphan hash stays reachable from the index; a failed bulk
        // removal may have removed some entries, so the doomed hashes are
        // scrubbed on that path too (survivors age out via their deadline)
        purge_hashes(&mut index, &doomed);
        removal?;
        drop(index);

        debug!(removed = keys.len(), ?dependencies, "invalidated cache entries");
        Ok(true)
    }

    /// Removes all entries and empties the index.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let mut index = self.inner.index.lock().await;
        self.inner.backend.clear().await?;
        index.clear();
        Ok(())
    }

    /// Evicts expired entries from the backend and drops their index
    /// registrations. Returns the number of backend entries removed.
    pub async fn gc(&self) -> Result<usize, CacheError> {
        let mut index = self.inner.index.lock().await;
        let removed = self.inner.backend.gc().await?;

        let registered: HashSet<String> = index.values().flatten().cloned().collect();
        let mut dead = HashSet::new();
        for hash in registered {
            if self.inner.backend.get(&hash).await?.is_none() {
                dead.insert(hash);
            }
        }
        purge_hashes(&mut index, &dead);

        Ok(removed)
    }

    /// Returns the number of index buckets currently holding hashes.
    ///
    /// Exposed for tests asserting the no-orphans invariant.
    pub async fn index_bucket_count(&self) -> usize {
        self.inner.index.lock().await.len()
    }
}

fn purge_hashes(index: &mut HashMap<String, HashSet<String>>, hashes: &HashSet<String>) {
    if hashes.is_empty() {
        return;
    }
    index.retain(|_, registered| {
        for hash in hashes {
            registered.remove(hash);
        }
        !registered.is_empty()
    });
}
