//! Cache Statistics Module
//!
//! Hit/miss/eviction counters and the hit-rate view derived from them.

use serde::Serialize;

// == Cache Stats ==
/// Raw performance counters of one cache store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed to make room under the capacity limit
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / max(1, hits + misses), so an unused cache reports 0.0.
    pub fn hit_rate(&self) -> f64 {
        let total = (self.hits + self.misses).max(1);
        self.hits as f64 / total as f64
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Stats Snapshot ==
/// Point-in-time report of a store: counters, occupancy and hit rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Entries currently held, expired-but-unread ones included
    pub size: usize,
    /// Configured maximum number of entries
    pub capacity: usize,
    /// Default freshness window in seconds
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// hits / max(1, hits + misses)
    pub hit_rate: f64,
}

impl StatsSnapshot {
    /// Builds a snapshot from counters and store occupancy.
    pub fn new(stats: CacheStats, size: usize, capacity: usize, ttl_secs: u64) -> Self {
        Self {
            size,
            capacity,
            ttl_secs,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        }
    }

    /// Hit rate as a percentage string with one decimal, e.g. `"75.0%"`.
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.1}%", self.hit_rate * 100.0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn counted(hits: u64, misses: u64) -> CacheStats {
        let mut stats = CacheStats::new();
        (0..hits).for_each(|_| stats.record_hit());
        (0..misses).for_each(|_| stats.record_miss());
        stats
    }

    #[test]
    fn test_hit_rate_table() {
        for (hits, misses, expected) in [(0, 0, 0.0), (3, 0, 1.0), (0, 2, 0.0), (3, 1, 0.75)] {
            assert_eq!(counted(hits, misses).hit_rate(), expected, "{hits} hits, {misses} misses");
        }
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_snapshot_percent() {
        let snapshot = StatsSnapshot::new(counted(3, 1), 2, 10, 3600);
        assert_eq!(snapshot.hit_rate_percent(), "75.0%");
        assert_eq!(snapshot.hits + snapshot.misses, 4);
        assert_eq!(snapshot.size, 2);
    }

    #[test]
    fn test_snapshot_percent_empty() {
        let snapshot = StatsSnapshot::new(CacheStats::new(), 0, 10, 3600);
        assert_eq!(snapshot.hit_rate_percent(), "0.0%");
    }
}
