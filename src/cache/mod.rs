//! Cache Module
//!
//! In-memory store with lazy TTL expiry, LRU eviction and hit/miss/eviction counters.

mod clock;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;
mod value;


// Re-export public types
pub use clock::{current_timestamp_ms, duration_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use lru::RecencyOrder;
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
pub use value::CachedValue;
