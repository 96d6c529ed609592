//! Tiered Cache - a two-tier cache for pricing workloads
//!
//! A bounded in-process LRU+TTL tier in front of a shared Redis tier, with
//! pattern-based policy, deterministic key derivation, read-through
//! promotion and graceful degradation when Redis is unavailable.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod service;

pub use api::AppState;
pub use cache::{MemoryCache, MultiLevelCache, RemoteCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use service::{CacheService, KeyArgs, PatternId};
