//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use crate::models::ContentResponse;

// == Cache Entry ==
/// A cached content payload together with its expiry.
///
/// Entries are replaced wholesale on a repeated `set`; they are never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Fingerprint this entry is stored under
    pub key: String,
    /// The stored content
    pub payload: ContentResponse,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` from now.
    ///
    /// A TTL of zero is raised to one second so the expiry always lies
    /// in the future at write time.
    pub fn new(key: String, payload: ContentResponse, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = ttl_seconds.max(1).saturating_mul(1000);

        Self {
            key,
            payload,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is considered expired once the current time is greater than
    /// or equal to the expiration time.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }

    /// Returns remaining TTL in whole seconds.
    pub fn ttl_remaining(&self) -> u64 {
        self.ttl_remaining_ms() / 1000
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
