//! Recency Order Module
//!
//! Tracks access order of cached keys so the store can pick an eviction victim.

use std::collections::{BTreeMap, HashMap};

// == Recency Order ==
/// Orders keys from least to most recently touched.
///
/// Every touch stamps the key with a fresh, strictly increasing sequence
/// number. The smallest live stamp is the least recently used key, and since
/// stamps never repeat, keys untouched since insertion leave in insertion order.
#[derive(Debug, Default)]
pub struct RecencyOrder {
    /// Next sequence number to hand out
    next_seq: u64,
    /// Current stamp of each tracked key
    stamps: HashMap<String, u64>,
    /// Stamp -> key, oldest first
    order: BTreeMap<u64, String>,
}

impl RecencyOrder {
    // == Constructor ==
    /// Creates a new empty recency order.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.stamps.get_mut(key) {
            Some(stamp) => {
                self.order.remove(stamp);
                *stamp = seq;
            }
            None => {
                self.stamps.insert(key.to_string(), seq);
            }
        }
        self.order.insert(seq, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.stamps.remove(key) {
            Some(stamp) => {
                self.order.remove(&stamp);
                true
            }
            None => false,
        }
    }

    // == Pop Least Recent ==
    /// Returns and stops tracking the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    /// Keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Forgets every key. The sequence counter keeps running.
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.order.clear();
    }
}
