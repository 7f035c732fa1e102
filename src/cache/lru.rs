//! LRU Tracker Module
//!
//! Recency index over cache fingerprints, used to pick eviction victims.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Orders fingerprints by last use.
///
/// Every touch stamps the key with a fresh tick from a monotonic clock.
/// `order` is keyed by tick, so its first entry is always the least
/// recently used key and touches stay logarithmic in the entry count.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Fingerprint -> tick of its last use
    ticks: HashMap<String, u64>,
    /// Tick -> fingerprint, oldest first
    order: BTreeMap<u64, String>,
    clock: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `key` as the most recently used fingerprint.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        let tick = self.clock;

        match self.ticks.get_mut(key) {
            Some(previous) => {
                self.order.remove(&*previous);
                *previous = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
            }
        }
        self.order.insert(tick, key.to_string());
    }

    /// Forgets `key`. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used fingerprint.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// The fingerprint `evict_oldest` would return next.
    pub fn oldest(&self) -> Option<&str> {
        self.order.first_key_value().map(|(_, key)| key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ticks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
