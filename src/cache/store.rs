//! Cache Store Module
//!
//! Content cache combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, Lookup, LruTracker};
use crate::models::ContentResponse;

// == Cache Store ==
/// Fingerprint-keyed content cache with TTL expiry and an LRU capacity bound.
///
/// Expired entries read as absent but stay in memory until a sweep
/// (`cleanup_expired`), an eviction, or a `set` on the same key replaces them.
#[derive(Debug)]
pub struct CacheStore {
    /// Fingerprint -> entry storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Stores a payload under `key`, expiring `ttl_seconds` from now.
    ///
    /// Any previous entry for the key is replaced and its TTL reset.
    /// If the cache is at capacity, the least recently used entry is evicted.
    pub fn set(&mut self, key: String, payload: ContentResponse, ttl_seconds: u64) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                tracing::debug!(key = %evicted_key, "Evicted least recently used entry");
            }
        }

        let entry = CacheEntry::new(key.clone(), payload, ttl_seconds);
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
    }

    // == Get ==
    /// Returns the payload for `key` if present and not expired.
    ///
    /// An expired entry counts as a miss and is left in place.
    pub fn get(&mut self, key: &str) -> Option<ContentResponse> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let payload = entry.payload.clone();
                self.stats.record(Lookup::Hit);
                self.lru.touch(key);
                Some(payload)
            }
            _ => {
                self.stats.record(Lookup::Miss);
                None
            }
        }
    }

    /// Like `get`, but leaves statistics and LRU order untouched.
    pub fn peek(&self, key: &str) -> Option<ContentResponse> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.payload.clone())
    }

    /// Remaining lifetime of a live entry, in whole seconds.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.with_entries(self.entries.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired_keys.len()
    }

    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
