//! Cache Entry Module
//!
//! A stored value together with the moment it was stored and how long it stays fresh.

// == Cache Entry ==
/// Represents a single cache entry with value and freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Store timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Freshness window in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stored at `now_ms`.
    pub fn new(value: V, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            stored_at: now_ms,
            ttl_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at)
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now_ms`.
    ///
    /// An entry is fresh while `now - stored_at < ttl`. Once the full TTL has
    /// elapsed it is expired, so the boundary instant itself is a miss.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) >= self.ttl_ms
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), 10_000, 60_000);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.stored_at, 10_000);
        assert!(!entry.is_expired(10_000));
    }

    #[test]
    fn test_entry_fresh_just_before_ttl() {
        let entry = CacheEntry::new(1u8, 10_000, 1_000);
        assert!(!entry.is_expired(10_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(1u8, 10_000, 1_000);

        // Exactly one TTL later the entry is no longer fresh
        assert!(entry.is_expired(11_000), "Entry should be expired at boundary");
        assert!(entry.is_expired(11_001));
    }

    #[test]
    fn test_clock_behind_store_time() {
        // A clock that reads earlier than stored_at counts as zero age
        let entry = CacheEntry::new(1u8, 10_000, 1_000);
        assert_eq!(entry.age_ms(9_000), 0);
        assert!(!entry.is_expired(9_000));
    }
}
