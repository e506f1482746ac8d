//! Cache backend trait and statistics.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vane_core::VaneResult;

use super::key::CacheKey;

/// Raw byte-oriented cache backend.
///
/// Backends store opaque serialized payloads under [`CacheKey`]s with a
/// per-entry TTL and know nothing about the domain types above them.
/// Every implementation expires lazily: an entry past its deadline is
/// reported as a miss on the next read.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired and absent entries both return `Ok(None)`.
    async fn get(&self, key: &CacheKey) -> VaneResult<Option<Vec<u8>>>;

    /// Store a value that expires `ttl` from now, replacing any previous
    /// entry under the key.
    async fn set_with_ttl(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> VaneResult<()>;

    /// Remove an entry. Deleting an absent key succeeds.
    async fn delete(&self, key: &CacheKey) -> VaneResult<()>;

    /// Point-in-time counters for observability.
    async fn stats(&self) -> VaneResult<CacheStats>;
}

/// Counters exported to the metrics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently stored, including ones not yet lazily expired.
    pub entry_count: u64,
    /// Entries dropped because a read found them past their deadline.
    pub expired: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
