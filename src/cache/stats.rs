//! Cache Statistics Module
//!
//! Tracks per-tier counters and produces read-only snapshots of them.

use serde::Serialize;

use crate::cache::BackendInfo;

// == Cache Stats ==
/// Live counters for one cache tier.
///
/// Owners keep this behind their own lock; readers only ever see a
/// [`StatsSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    errors: u64,
    evictions: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    /// Counts a bulk removal of `count` keys.
    pub fn record_deletes(&mut self, count: u64) {
        self.deletes += count;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Hit Ratio ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Snapshot ==
    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            sets: self.sets,
            deletes: self.deletes,
            errors: self.errors,
            evictions: self.evictions,
            hit_ratio: self.hit_ratio(),
        }
    }
}

// == Snapshots ==
/// Read-only projection of [`CacheStats`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
}

/// Stats for the in-process tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    /// Current occupancy
    pub memory_usage: usize,
    pub max_size: usize,
}

/// Stats for the remote tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteStats {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    pub connected: bool,
    /// Backend-reported figures, absent when the backend could not be queried
    pub backend: Option<BackendInfo>,
}

/// Three-way breakdown for the composed cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiLevelStats {
    pub aggregate: StatsSnapshot,
    pub l1: MemoryStats,
    pub l2: RemoteStats,
}
