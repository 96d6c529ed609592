//! Memory Cache Module
//!
//! The in-process tier: a bounded map with LRU eviction and lazy TTL expiry.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{AccessOrder, CacheEntry, CacheStats, MemoryStats};
use crate::error::{CacheError, Result};

// == Memory Cache ==
/// Bounded, process-local cache with strict LRU eviction.
///
/// Map, access order and counters share one lock, taken once per
/// operation, so eviction bookkeeping never interleaves with an insert.
#[derive(Debug)]
pub struct MemoryCache<V> {
    inner: Mutex<MemoryInner<V>>,
    max_size: usize,
    default_ttl: Duration,
}

#[derive(Debug)]
struct MemoryInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: AccessOrder,
    stats: CacheStats,
}

impl<V> MemoryInner<V> {
    fn remove(&mut self, key: &str) -> bool {
        self.order.remove(key);
        self.entries.remove(key).is_some()
    }

    fn insert(&mut self, key: String, value: V, ttl: Duration, max_size: usize) -> Result<()> {
        if !self.entries.contains_key(&key) && self.entries.len() >= max_size {
            let evicted = self.order.pop_lru().ok_or_else(|| {
                CacheError::Internal(format!(
                    "cache at capacity ({max_size}) with no eviction candidate"
                ))
            })?;
            self.entries.remove(&evicted);
            self.stats.record_eviction();
            debug!(key = %evicted, "Evicted least recently used entry");
        }

        self.order.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl));
        Ok(())
    }
}

impl<V: Clone> MemoryCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries, each living for
    /// `default_ttl` unless a per-entry TTL is given.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                entries: HashMap::new(),
                order: AccessOrder::new(),
                stats: CacheStats::new(),
            }),
            max_size,
            default_ttl,
        }
    }

    // == Get ==
    /// Returns the value if present and fresh.
    ///
    /// Expired entries are removed and counted as misses. A hit makes the key
    /// the most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                inner.stats.record_miss();
                return None;
            }
        };

        if expired {
            inner.remove(key);
            inner.stats.record_miss();
            debug!(key, "Expired entry removed on access");
            return None;
        }

        inner.order.touch(key);
        inner.stats.record_hit();
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, evicting the least recently used key when full.
    ///
    /// Overwriting refreshes value, TTL and recency without taking an extra
    /// slot. Returns false when the write could not be completed.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> bool {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.insert(key, value, ttl, self.max_size) {
            Ok(()) => {
                inner.stats.record_set();
                true
            }
            Err(e) => {
                inner.stats.record_error();
                warn!(error = %e, "Memory cache set failed");
                false
            }
        }
    }

    // == Delete ==
    /// Removes a key. Returns true iff it existed.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let existed = inner.remove(key);
        if existed {
            inner.stats.record_delete();
        }
        existed
    }

    // == Clear ==
    /// Empties the store and the access order.
    pub fn clear(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        true
    }

    /// True if a fresh entry exists. Does not touch recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Stats ==
    pub fn stats(&self) -> MemoryStats {
        let inner = self.inner.lock();
        MemoryStats {
            counters: inner.stats.snapshot(),
            memory_usage: inner.entries.len(),
            max_size: self.max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
