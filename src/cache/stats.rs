//! Cache statistics
//!
//! Lookup and eviction counters reported by `GET /api/stats`.

use crate::models::StatsResponse;

/// Outcome of one cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    /// Absent or expired
    Miss,
}

// == Cache Stats ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries pushed out by the capacity bound
    pub evictions: u64,
    /// Stored entries at snapshot time, expired ones included
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lookup: Lookup) {
        match lookup {
            Lookup::Hit => self.hits = self.hits.saturating_add(1),
            Lookup::Miss => self.misses = self.misses.saturating_add(1),
        }
    }

    pub fn record_eviction(&mut self) {
        self.evictions = self.evictions.saturating_add(1);
    }

    pub fn lookups(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    /// hits / lookups, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Snapshot with the entry count filled in.
    pub fn with_entries(mut self, total_entries: usize) -> Self {
        self.total_entries = total_entries;
        self
    }
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_before_any_lookup() {
        let stats = CacheStats::new();
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        for lookup in [Lookup::Hit, Lookup::Hit, Lookup::Hit, Lookup::Miss] {
            stats.record(lookup);
        }
        assert_eq!(stats.lookups(), 4);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_into_stats_response() {
        let mut stats = CacheStats::new();
        stats.record(Lookup::Hit);
        stats.record(Lookup::Miss);
        stats.record_eviction();

        let response = StatsResponse::from(stats.with_entries(7));

        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.evictions, 1);
        assert_eq!(response.total_entries, 7);
        assert!((response.hit_rate - 0.5).abs() < f64::EPSILON);
    }
}
