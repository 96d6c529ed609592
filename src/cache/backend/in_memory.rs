//! In-process stand-in for a shared backend.
//!
//! Clones share one store, so several caches built over clones of the same
//! backend behave like processes sharing one Redis.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BackendInfo, RemoteBackend};
use crate::error::{CacheError, Result};

#[derive(Debug)]
struct StoredPayload {
    payload: String,
    expires_at: Instant,
}

/// Shared in-process key/value store with expiry and glob enumeration.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<Mutex<HashMap<String, StoredPayload>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .store
            .lock()
            .iter()
            .filter(|(_, stored)| stored.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Raw payload as written, bypassing the remote tier's decoding.
    pub fn raw(&self, key: &str) -> Option<String> {
        let store = self.store.lock();
        store
            .get(key)
            .filter(|stored| stored.expires_at > Instant::now())
            .map(|stored| stored.payload.clone())
    }
}

#[async_trait]
impl RemoteBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.lock();
        let expired = match store.get(key) {
            Some(stored) => stored.expires_at <= Instant::now(),
            None => return Ok(None),
        };
        if expired {
            store.remove(key);
            return Ok(None);
        }
        Ok(store.get(key).map(|stored| stored.payload.clone()))
    }

    async fn set_ex(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
        let stored = StoredPayload {
            payload: payload.to_string(),
            expires_at: Instant::now() + ttl.max(Duration::from_secs(1)),
        };
        self.store.lock().insert(key.to_string(), stored);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let now = Instant::now();
        let mut store = self.store.lock();
        let removed = keys
            .iter()
            .filter_map(|key| store.remove(key))
            .filter(|stored| stored.expires_at > now)
            .count();
        Ok(removed as u64)
    }

    async fn scan(&self, glob: &str) -> Result<Vec<String>> {
        let pattern = glob::Pattern::new(glob)
            .map_err(|e| CacheError::InvalidPattern(format!("{glob}: {e}")))?;
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| pattern.matches(key))
            .collect())
    }

    async fn info(&self) -> Result<BackendInfo> {
        let store = self.store.lock();
        let used: usize = store
            .iter()
            .map(|(key, stored)| key.len() + stored.payload.len())
            .sum();
        Ok(BackendInfo {
            used_memory: Some(used as u64),
            used_memory_human: Some(format!("{used}B")),
            keyspace_hits: None,
            keyspace_misses: None,
            total_keys: Some(store.len() as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = InMemoryBackend::new();

        backend.set_ex("k", "\"v\"", TTL).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("\"v\""));

        let removed = backend
            .delete(&["k".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let a = InMemoryBackend::new();
        let b = a.clone();

        a.set_ex("shared", "1", TTL).await.unwrap();
        assert_eq!(b.get("shared").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_scan_matches_glob() {
        let backend = InMemoryBackend::new();
        for key in ["pricing:aws", "pricing:gcp", "calc:1", "pricingx"] {
            backend.set_ex(key, "0", TTL).await.unwrap();
        }

        let keys = backend.scan("pricing:*").await.unwrap();
        assert_eq!(keys, vec!["pricing:aws".to_string(), "pricing:gcp".to_string()]);
        assert!(backend.scan("nothing:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_rejects_bad_glob() {
        let backend = InMemoryBackend::new();
        let result = backend.scan("[unclosed").await;
        assert!(matches!(result, Err(CacheError::InvalidPattern(_))));
    }

    #[tokio::test]
    async fn test_info_counts_keys() {
        let backend = InMemoryBackend::new();
        backend.set_ex("ab", "cd", TTL).await.unwrap();

        let info = backend.info().await.unwrap();
        assert_eq!(info.total_keys, Some(1));
        assert_eq!(info.used_memory, Some(4));
    }
}
