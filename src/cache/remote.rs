//! Remote Cache Module
//!
//! The shared tier. Values cross into the backend as JSON text; every call is
//! bounded by a response timeout and no failure is ever raised to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, RemoteBackend, RemoteStats};
use crate::error::{CacheError, Result};

// == Remote Cache ==
/// Network-backed tier that degrades to no-ops when its backend is missing
/// or failing.
///
/// A cache built without a backend and one whose backend fails every call
/// behave the same: reads are absent, writes are false, and the error
/// counter moves by one per call.
pub struct RemoteCache {
    backend: Option<Arc<dyn RemoteBackend>>,
    timeout: Duration,
    stats: Mutex<CacheStats>,
}

impl RemoteCache {
    // == Constructors ==
    pub fn new(backend: Option<Arc<dyn RemoteBackend>>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Builds a tier over a backend.
    pub fn with_backend(backend: impl RemoteBackend + 'static, timeout: Duration) -> Self {
        Self::new(Some(Arc::new(backend)), timeout)
    }

    /// Builds a tier with no client at all.
    pub fn disconnected() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&dyn RemoteBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| CacheError::BackendUnavailable("no remote client".to_string()))
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(CacheError::Timeout(self.timeout.as_millis() as u64)))
    }

    fn record_failure(&self, op: &str, key: &str, error: &CacheError) {
        self.stats.lock().record_error();
        warn!(op, key, error = %error, "Remote cache call failed");
    }

    // == Get ==
    /// Reads and decodes a value. Any fault yields `None`.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                self.stats.lock().record_hit();
                debug!(key, "Remote cache hit");
                Some(value)
            }
            Ok(None) => {
                self.stats.lock().record_miss();
                debug!(key, "Remote cache miss");
                None
            }
            Err(e) => {
                self.record_failure("get", key, &e);
                None
            }
        }
    }

    async fn try_get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        let backend = self.backend()?;
        let payload = self.bounded(backend.get(key)).await?;
        Ok(payload
            .map(|payload| serde_json::from_str(&payload))
            .transpose()?)
    }

    // == Set ==
    /// Encodes and writes a value expiring after `ttl`.
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V, ttl: Duration) -> bool {
        match self.try_set(key, value, ttl).await {
            Ok(()) => {
                self.stats.lock().record_set();
                true
            }
            Err(e) => {
                self.record_failure("set", key, &e);
                false
            }
        }
    }

    async fn try_set<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl: Duration,
    ) -> Result<()> {
        let backend = self.backend()?;
        let payload = serde_json::to_string(value)?;
        self.bounded(backend.set_ex(key, &payload, ttl)).await
    }

    // == Delete ==
    /// Returns true only if an entry was actually removed.
    pub async fn delete(&self, key: &str) -> bool {
        let result = match self.backend() {
            Ok(backend) => self.bounded(backend.delete(&[key.to_string()])).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(removed) if removed > 0 => {
                self.stats.lock().record_delete();
                true
            }
            Ok(_) => false,
            Err(e) => {
                self.record_failure("delete", key, &e);
                false
            }
        }
    }

    // == Clear ==
    /// Removes every key matching `glob`. No matches is still a success.
    pub async fn clear(&self, glob: &str) -> bool {
        match self.try_clear(glob).await {
            Ok(removed) => {
                self.stats.lock().record_deletes(removed);
                debug!(glob, removed, "Remote cache cleared");
                true
            }
            Err(e) => {
                self.record_failure("clear", glob, &e);
                false
            }
        }
    }

    async fn try_clear(&self, glob: &str) -> Result<u64> {
        let backend = self.backend()?;
        let keys = self.bounded(backend.scan(glob)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.bounded(backend.delete(&keys)).await
    }

    // == Stats ==
    /// Local counters merged with whatever the backend reports.
    pub async fn stats(&self) -> RemoteStats {
        let backend = match self.backend() {
            Ok(backend) => match self.bounded(backend.info()).await {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!(backend = backend.name(), error = %e, "Backend info unavailable");
                    None
                }
            },
            Err(_) => None,
        };

        RemoteStats {
            counters: self.stats.lock().snapshot(),
            connected: self.is_connected(),
            backend,
        }
    }
}

impl std::fmt::Debug for RemoteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCache")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}
