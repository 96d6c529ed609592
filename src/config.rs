//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the in-process tier can hold
    pub memory_max_size: usize,
    /// Default TTL in seconds for the in-process tier
    pub memory_ttl: u64,
    /// Redis connection URL; `None` runs on the in-process tier alone
    pub redis_url: Option<String>,
    /// Redis connect timeout in milliseconds
    pub redis_connect_timeout_ms: u64,
    /// Redis per-command response timeout in milliseconds
    pub redis_response_timeout_ms: u64,
    /// HTTP server port for the monitoring endpoints
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_MAX_SIZE` - Maximum in-process entries (default: 1000)
    /// - `MEMORY_TTL` - In-process TTL in seconds (default: 300)
    /// - `REDIS_URL` - Redis URL (default: unset, in-process tier only)
    /// - `REDIS_CONNECT_TIMEOUT_MS` - Connect timeout (default: 2000)
    /// - `REDIS_RESPONSE_TIMEOUT_MS` - Response timeout (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_max_size: parse_var("MEMORY_MAX_SIZE").unwrap_or(defaults.memory_max_size),
            memory_ttl: parse_var("MEMORY_TTL").unwrap_or(defaults.memory_ttl),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            redis_connect_timeout_ms: parse_var("REDIS_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.redis_connect_timeout_ms),
            redis_response_timeout_ms: parse_var("REDIS_RESPONSE_TIMEOUT_MS")
                .unwrap_or(defaults.redis_response_timeout_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    pub fn memory_ttl(&self) -> Duration {
        Duration::from_secs(self.memory_ttl)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_response_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_max_size: 1000,
            memory_ttl: 300,
            redis_url: None,
            redis_connect_timeout_ms: 2000,
            redis_response_timeout_ms: 1000,
            server_port: 3000,
        }
    }
}
