//! Cache Entry Module
//!
//! Defines the in-process entry with its TTL bookkeeping.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A value held by the in-process tier.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was last written
    pub touched_at: Instant,
    /// Maximum age measured from `touched_at`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            touched_at: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its full TTL has elapsed, so a zero TTL
    /// entry is never readable.
    pub fn is_expired(&self) -> bool {
        self.touched_at.elapsed() >= self.ttl
    }
}
