//! Read-through cache resolution.
//!
//! This module implements the one consistency protocol every read path in
//! the service goes through: check the cache, fall back to the loader on a
//! miss, then populate the cache best-effort. Cache trouble never fails a
//! request that the loader could serve.
//!
//! # Fail-Open Contract
//!
//! - A backend `get` error counts as a miss; the loader runs.
//! - A backend `set_with_ttl` or `delete` error is logged and swallowed.
//! - A cached payload that no longer deserializes counts as a miss.
//! - Loader errors (including not-found) propagate unchanged and are
//!   never written to the cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use vane_core::VaneResult;

use super::key::CacheKey;
use super::traits::{CacheStats, CacheStore};

/// TTL applied to every cache entry. One uniform deadline keeps the
/// staleness window easy to reason about across key shapes.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(600);

/// Configuration for the read-through cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub entry_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_ENTRY_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }
}

/// The cache-aside resolver shared by every read path.
#[derive(Clone)]
pub struct ReadThroughCache {
    backend: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl ReadThroughCache {
    pub fn new(backend: Arc<dyn CacheStore>) -> Self {
        Self::with_config(backend, CacheConfig::default())
    }

    pub fn with_config(backend: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Resolve a value through the cache.
    ///
    /// On a hit the loader never runs. On a miss (absent, expired,
    /// undecodable, or backend read failure) the loader runs and a
    /// successful result is written back with the configured TTL.
    pub async fn get_or_load<T, F, Fut>(&self, key: &CacheKey, load: F) -> VaneResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = VaneResult<T>>,
    {
        match self.backend.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    tracing::debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "undecodable cache entry, treating as miss");
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache read failed, treating as miss");
            }
        }

        let value = load().await?;
        self.write_back(key, &value).await;
        Ok(value)
    }

    /// Drop an entry so the next read refetches. Backend failures are
    /// logged and swallowed; writers must not fail on cache trouble.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Err(e) = self.backend.delete(key).await {
            tracing::warn!(key = %key, error = %e, "cache invalidation failed");
        } else {
            tracing::debug!(key = %key, "cache invalidated");
        }
    }

    /// Invalidate several keys, attempting every one regardless of failures.
    pub async fn invalidate_all(&self, keys: &[CacheKey]) {
        for key in keys {
            self.invalidate(key).await;
        }
    }

    pub async fn stats(&self) -> VaneResult<CacheStats> {
        self.backend.stats().await
    }

    async fn write_back<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize value for cache");
                return;
            }
        };
        if let Err(e) = self
            .backend
            .set_with_ttl(key, &bytes, self.config.entry_ttl)
            .await
        {
            tracing::warn!(key = %key, error = %e, "cache write failed, serving uncached");
        }
    }
}
