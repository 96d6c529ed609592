//! Redis backend for the remote tier.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{BackendInfo, RemoteBackend};
use crate::error::{CacheError, Result};

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis-backed transport over a multiplexed connection.
///
/// The connection is cheap to clone; each call works on its own clone.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    /// Connects and verifies the server answers `PING`, giving up after
    /// `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)?;

        let handshake = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, CacheError>(conn)
        };

        let conn = tokio::time::timeout(connect_timeout, handshake)
            .await
            .map_err(|_| CacheError::Timeout(connect_timeout.as_millis() as u64))??;

        info!(url, "Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl RemoteBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    async fn set_ex(&self, key: &str, payload: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, payload, seconds).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    async fn scan(&self, glob: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut found = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(glob)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            found.extend(keys);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    async fn info(&self) -> Result<BackendInfo> {
        let mut conn = self.conn.clone();

        let text: String = redis::cmd("INFO").query_async(&mut conn).await?;
        let total_keys: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;

        let mut info = BackendInfo::from_info_text(&text);
        info.total_keys = Some(total_keys);
        Ok(info)
    }
}
