//! Multi-Level Cache Module
//!
//! Composes the in-process tier (L1) with the remote tier (L2): reads fall
//! through and promote, writes fan out to both.

use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, MemoryCache, MultiLevelStats, RemoteCache};

// == Multi-Level Cache ==
/// L1 + L2 behind one contract.
///
/// Writes succeed when at least one tier accepts them. A value written only
/// to L1 is not visible to other processes until it is rewritten; a value
/// written only to L2 reaches L1 through promotion on the next read.
#[derive(Debug)]
pub struct MultiLevelCache<V> {
    memory: MemoryCache<V>,
    remote: RemoteCache,
    stats: Mutex<CacheStats>,
}

impl<V> MultiLevelCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    pub fn new(memory: MemoryCache<V>, remote: RemoteCache) -> Self {
        Self {
            memory,
            remote,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    pub fn memory(&self) -> &MemoryCache<V> {
        &self.memory
    }

    pub fn remote(&self) -> &RemoteCache {
        &self.remote
    }

    // == Get ==
    /// Reads L1, then L2. An L2 hit is copied into L1 with L1's default TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        if let Some(value) = self.memory.get(key) {
            self.stats.lock().record_hit();
            return Some(value);
        }

        match self.remote.get::<V>(key).await {
            Some(value) => {
                // Two readers may promote the same key; last write wins
                self.memory.set(key, value.clone(), None);
                self.stats.lock().record_hit();
                debug!(key, "Promoted remote hit into memory tier");
                Some(value)
            }
            None => {
                self.stats.lock().record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Writes both tiers. `ttl` defaults to L1's TTL for both.
    pub async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.memory.default_ttl());

        let l1 = self.memory.set(key, value.clone(), Some(ttl));
        let l2 = self.remote.set(key, &value, ttl).await;

        let mut stats = self.stats.lock();
        match (l1, l2) {
            (true, true) => {
                stats.record_set();
                true
            }
            (true, false) | (false, true) => {
                stats.record_set();
                debug!(key, l1, l2, "Write accepted by one tier only");
                true
            }
            (false, false) => {
                stats.record_error();
                warn!(key, "Write rejected by both tiers");
                false
            }
        }
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        let l1 = self.memory.delete(key);
        let l2 = self.remote.delete(key).await;

        let deleted = l1 || l2;
        if deleted {
            self.stats.lock().record_delete();
        }
        deleted
    }

    // == Clear ==
    /// Empties L1 and removes L2 keys matching `glob`.
    pub async fn clear(&self, glob: &str) -> bool {
        let l1 = self.memory.clear();
        let l2 = self.remote.clear(glob).await;
        l1 || l2
    }

    // == Stats ==
    pub async fn stats(&self) -> MultiLevelStats {
        let aggregate = self.stats.lock().snapshot();
        MultiLevelStats {
            aggregate,
            l1: self.memory.stats(),
            l2: self.remote.stats().await,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryBackend;

    const TTL: Duration = Duration::from_secs(300);

    fn shared_cache(backend: &InMemoryBackend) -> MultiLevelCache<u32> {
        MultiLevelCache::new(
            MemoryCache::new(100, TTL),
            RemoteCache::with_backend(backend.clone(), Duration::from_secs(1)),
        )
    }

    #[tokio::test]
    async fn test_l1_hit_skips_remote() {
        let backend = InMemoryBackend::new();
        let cache = shared_cache(&backend);

        assert!(cache.set("k", 1, None).await);
        assert_eq!(cache.get("k").await, Some(1));

        let stats = cache.stats().await;
        assert_eq!(stats.aggregate.hits, 1);
        assert_eq!(stats.l1.counters.hits, 1);
        assert_eq!(stats.l2.counters.hits, 0);
        assert_eq!(stats.l2.counters.misses, 0);
    }

    #[tokio::test]
    async fn test_promotion_from_remote() {
        let backend = InMemoryBackend::new();
        let writer = shared_cache(&backend);
        let reader = shared_cache(&backend);

        writer.set("k", 42, None).await;
        assert!(!reader.memory().contains("k"));

        assert_eq!(reader.get("k").await, Some(42));
        assert_eq!(reader.memory().get("k"), Some(42));

        // Second read is served by L1 alone
        assert_eq!(reader.get("k").await, Some(42));
        let stats = reader.stats().await;
        assert_eq!(stats.l2.counters.hits, 1);
        assert_eq!(stats.aggregate.hits, 2);
    }

    #[tokio::test]
    async fn test_double_miss() {
        let backend = InMemoryBackend::new();
        let cache = shared_cache(&backend);

        assert_eq!(cache.get("missing").await, None);
        let stats = cache.stats().await;
        assert_eq!(stats.aggregate.misses, 1);
        assert_eq!(stats.l1.counters.misses, 1);
        assert_eq!(stats.l2.counters.misses, 1);
    }

    #[tokio::test]
    async fn test_set_succeeds_on_memory_alone() {
        let cache: MultiLevelCache<u32> =
            MultiLevelCache::new(MemoryCache::new(10, TTL), RemoteCache::disconnected());

        assert!(cache.set("k", 7, None).await);
        assert_eq!(cache.get("k").await, Some(7));

        let stats = cache.stats().await;
        assert_eq!(stats.aggregate.sets, 1);
        assert_eq!(stats.l2.counters.errors, 1);
    }

    #[tokio::test]
    async fn test_set_fails_when_both_tiers_fail() {
        let cache: MultiLevelCache<u32> =
            MultiLevelCache::new(MemoryCache::new(0, TTL), RemoteCache::disconnected());

        assert!(!cache.set("k", 7, None).await);
        assert_eq!(cache.stats().await.aggregate.errors, 1);
    }

    #[tokio::test]
    async fn test_delete_fans_out() {
        let backend = InMemoryBackend::new();
        let cache = shared_cache(&backend);

        cache.set("k", 1, None).await;
        assert!(cache.delete("k").await);
        assert!(backend.keys().is_empty());
        assert_eq!(cache.get("k").await, None);
        assert!(!cache.delete("k").await);
    }

    #[tokio::test]
    async fn test_clear_scoped_to_glob_on_remote() {
        let backend = InMemoryBackend::new();
        let cache = shared_cache(&backend);

        cache.set("pricing:a", 1, None).await;
        cache.set("calc:a", 2, None).await;

        assert!(cache.clear("pricing:*").await);
        assert!(cache.memory().is_empty());
        assert_eq!(backend.keys(), vec!["calc:a".to_string()]);
        assert_eq!(cache.get("calc:a").await, Some(2));
        assert_eq!(cache.get("pricing:a").await, None);
    }
}
