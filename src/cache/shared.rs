//! Shared Cache Module
//!
//! Thread-safe handle over a single cache store, shared by every producer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheStore, CachedValue, Clock, StatsSnapshot};
use crate::keys::CacheKey;

// == Shared Cache ==
/// Cloneable handle to one `CacheStore<CachedValue>`.
///
/// Each method holds the lock only for the single store operation it wraps,
/// so callers never keep it across their own I/O.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<RwLock<CacheStore<CachedValue>>>,
}

impl SharedCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self::from_store(CacheStore::new(max_size, ttl))
    }

    pub fn with_clock(max_size: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::from_store(CacheStore::with_clock(max_size, ttl, clock))
    }

    pub fn from_store(store: CacheStore<CachedValue>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Looks a key up. Takes the write lock: hits move recency and counters.
    pub async fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.inner.write().await.get(key.as_str())
    }

    pub async fn set(&self, key: &CacheKey, value: CachedValue) {
        self.inner.write().await.set(key.as_str(), value);
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    /// Empties the store, returning the number of entries it held.
    pub async fn clear(&self) -> usize {
        self.inner.write().await.clear()
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.read().await.stats()
    }

    pub async fn contains_key(&self, key: &CacheKey) -> bool {
        self.inner.read().await.contains_key(key.as_str())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
