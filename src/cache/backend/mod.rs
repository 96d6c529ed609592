//! Remote Backends
//!
//! Raw key/value transports the remote tier talks to. The remote tier owns
//! JSON encoding, timeouts and counters; a backend only moves strings.

#[cfg(test)]
mod failing;
mod in_memory;
mod redis_backend;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

#[cfg(test)]
pub(crate) use failing::FailingBackend;
pub use in_memory::InMemoryBackend;
pub use redis_backend::RedisBackend;

// == Remote Backend ==
/// Transport behind the remote tier.
///
/// Implementations must be safe to call concurrently; the backend owns its
/// own concurrency.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `payload` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, payload: &str, ttl: Duration) -> Result<()>;

    /// Removes the given keys, returning how many actually existed.
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    /// Enumerates keys matching a glob (`*`, `?`, `[...]`).
    async fn scan(&self, glob: &str) -> Result<Vec<String>>;

    /// Backend-reported memory and keyspace figures.
    async fn info(&self) -> Result<BackendInfo>;
}

// == Backend Info ==
/// Figures reported by the backend itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendInfo {
    pub used_memory: Option<u64>,
    pub used_memory_human: Option<String>,
    pub keyspace_hits: Option<u64>,
    pub keyspace_misses: Option<u64>,
    pub total_keys: Option<u64>,
}

impl BackendInfo {
    /// Parses the `field:value` lines of a Redis `INFO` reply.
    pub fn from_info_text(info: &str) -> Self {
        let mut parsed = Self::default();
        for line in info.lines() {
            let Some((field, value)) = line.trim().split_once(':') else {
                continue;
            };
            match field {
                "used_memory" => parsed.used_memory = value.parse().ok(),
                "used_memory_human" => parsed.used_memory_human = Some(value.to_string()),
                "keyspace_hits" => parsed.keyspace_hits = value.parse().ok(),
                "keyspace_misses" => parsed.keyspace_misses = value.parse().ok(),
                _ => {}
            }
        }
        parsed
    }
}
