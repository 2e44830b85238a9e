//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with recency tracking and lazy TTL expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::cache::{
    duration_ms, CacheEntry, CacheStats, Clock, RecencyOrder, StatsSnapshot, SystemClock,
};

// == Cache Store ==
/// Key/value storage with LRU capacity eviction and TTL freshness.
///
/// Expiry is lazy: an entry past its TTL keeps its slot until a `get`
/// touches it or capacity pressure evicts it.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Access order, least recent first
    recency: RecencyOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Freshness window applied by `set`
    ttl: Duration,
    /// Time source for `stored_at` and expiry checks
    clock: Arc<dyn Clock>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store backed by the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `ttl` - How long a stored value stays fresh
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self::with_clock(max_size, ttl, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(max_size: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyOrder::new(),
            stats: CacheStats::new(),
            max_size,
            ttl,
            clock,
        }
    }

    // == Get ==
    /// Retrieves a fresh value by key.
    ///
    /// A fresh entry counts as a hit and becomes most recently used. A stale
    /// entry is dropped (not an eviction) and counts as a miss, as does an
    /// absent key.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.recency.remove(key);
            self.stats.record_miss();
            trace!(key, "dropped expired entry");
            return None;
        }

        self.stats.record_hit();
        self.recency.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value under the store's TTL.
    ///
    /// Overwriting keeps the entry count; inserting a new key into a full
    /// store first evicts the least recently used entry.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value with its own freshness window.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();

        if self.max_size == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            if let Some(victim) = self.recency.pop_least_recent() {
                self.entries.remove(&victim);
                self.stats.record_eviction();
                trace!(key = %victim, "evicted least recently used entry");
            }
        }

        let entry = CacheEntry::new(value, self.clock.now_ms(), duration_ms(ttl));
        self.entries.insert(key.clone(), entry);
        self.recency.touch(&key);
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was present; absent keys are fine.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.recency.remove(key);
        removed
    }

    // == Clear ==
    /// Drops every entry and zeroes the counters. Returns how many entries were held.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        self.stats.reset();
        cleared
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(self.stats, self.entries.len(), self.max_size, self.ttl.as_secs())
    }

    /// Whether a key is held, fresh or not. No stats or recency side effects.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.recency.iter().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
