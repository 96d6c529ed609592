//! Cache Module
//!
//! The two cache tiers and their composition:
//! - [`MemoryCache`]: bounded in-process LRU with TTL (L1)
//! - [`RemoteCache`]: JSON over a shared [`RemoteBackend`] (L2)
//! - [`MultiLevelCache`]: read-through promotion and fan-out writes

mod backend;
mod entry;
mod lru;
mod memory;
mod multi_level;
mod remote;
mod stats;


// Re-export public types
#[cfg(test)]
pub(crate) use backend::FailingBackend;
pub use backend::{BackendInfo, InMemoryBackend, RedisBackend, RemoteBackend};
pub use entry::CacheEntry;
pub use lru::AccessOrder;
pub use memory::MemoryCache;
pub use multi_level::MultiLevelCache;
pub use remote::RemoteCache;
pub use stats::{CacheStats, MemoryStats, MultiLevelStats, RemoteStats, StatsSnapshot};
