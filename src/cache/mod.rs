//! Cache Module
//!
//! Provides the in-memory content cache with TTL expiration and LRU eviction.

mod entry;
mod fingerprint;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use fingerprint::{fingerprint, FINGERPRINT_SEPARATOR};
pub use lru::LruTracker;
pub use stats::{CacheStats, Lookup};
pub use store::CacheStore;
