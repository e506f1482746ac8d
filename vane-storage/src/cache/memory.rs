//! In-memory cache backend.
//!
//! The default backend when no LMDB path is configured. Entries live in a
//! `HashMap` behind a `tokio::sync::RwLock` and expire lazily on read.
//! Uses `tokio::time::Instant` for deadlines so tests can drive expiry
//! with a paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use vane_core::VaneResult;

use super::key::CacheKey;
use super::traits::{CacheStats, CacheStore};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache keyed by the canonical key string.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries only; lazily-expired leftovers are not counted.
    pub async fn len(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> VaneResult<Option<Vec<u8>>> {
        let encoded = key.encode();
        {
            let entries = self.entries.read().await;
            match entries.get(&encoded) {
                Some(entry) if !entry.is_expired() => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return Ok(None);
                }
            }
        }
        // Found but expired: drop it under the write lock.
        let mut entries = self.entries.write().await;
        if entries.get(&encoded).is_some_and(|e| e.is_expired()) {
            entries.remove(&encoded);
            self.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> VaneResult<()> {
        let entry = Entry {
            value: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.encode(), entry);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> VaneResult<()> {
        self.entries.write().await.remove(&key.encode());
        Ok(())
    }

    async fn stats(&self) -> VaneResult<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len().await as u64,
            expired: self.expired.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vane_core::new_location_id;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Location(new_location_id());
        cache
            .set_with_ttl(&key, b"payload", Duration::from_secs(600))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_get_absent_key_is_none() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Weather(new_location_id());
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Locations;
        cache
            .set_with_ttl(&key, b"list", Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_deadline() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Locations;
        cache
            .set_with_ttl(&key, b"old", Duration::from_secs(10))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache
            .set_with_ttl(&key, b"new", Duration::from_secs(10))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Location(new_location_id());
        cache
            .set_with_ttl(&key, b"x", Duration::from_secs(600))
            .await
            .unwrap();
        cache.delete(&key).await.unwrap();
        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_track_hits_misses_and_expiry() {
        let cache = InMemoryCache::new();
        let key = CacheKey::Locations;
        cache.get(&key).await.unwrap(); // miss
        cache
            .set_with_ttl(&key, b"v", Duration::from_secs(5))
            .await
            .unwrap();
        cache.get(&key).await.unwrap(); // hit
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.get(&key).await.unwrap(); // expired -> miss

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.entry_count, 0);
    }
}
