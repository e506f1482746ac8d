//! LMDB-backed cache implementation.
//!
//! Uses the heed crate (Rust bindings for LMDB) to give cached weather
//! payloads a memory-mapped store that survives process restarts.
//!
//! # Entry Layout
//!
//! Keys are the canonical [`CacheKey`] strings. Values are
//! `[expires_at_millis: i64 LE][payload bytes]`, so expiry can be checked
//! without deserializing the payload. Expiry uses the wall clock because
//! deadlines must hold across restarts.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses read transactions
//! for `get` and write transactions for `set_with_ttl` and `delete`;
//! statistics are tracked with atomic counters.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use vane_core::{VaneError, VaneResult};

use super::key::CacheKey;
use super::traits::{CacheStats, CacheStore};

/// Size of the expiry stamp prefixed to every stored value.
const EXPIRY_STAMP_LEN: usize = 8;

/// Error type for LMDB cache operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbCacheError> for VaneError {
    fn from(e: LmdbCacheError) -> Self {
        VaneError::cache(e.to_string())
    }
}

/// LMDB-backed [`CacheStore`].
pub struct LmdbCache {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl LmdbCache {
    /// Open (or create) an LMDB cache at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        })
    }

    fn encode_entry(expires_at_millis: i64, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(EXPIRY_STAMP_LEN + payload.len());
        buf.extend_from_slice(&expires_at_millis.to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    fn decode_entry(raw: &[u8]) -> Option<(i64, &[u8])> {
        if raw.len() < EXPIRY_STAMP_LEN {
            return None;
        }
        let (stamp, payload) = raw.split_at(EXPIRY_STAMP_LEN);
        let expires_at = i64::from_le_bytes(stamp.try_into().ok()?);
        Some((expires_at, payload))
    }

    fn remove_entry(&self, encoded_key: &[u8]) -> Result<bool, LmdbCacheError> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        let existed = self
            .db
            .delete(&mut wtxn, encoded_key)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        Ok(existed)
    }
}

#[async_trait]
impl CacheStore for LmdbCache {
    async fn get(&self, key: &CacheKey) -> VaneResult<Option<Vec<u8>>> {
        let encoded = key.encode();
        let raw = {
            let rtxn = self
                .env
                .read_txn()
                .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
            self.db
                .get(&rtxn, encoded.as_bytes())
                .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?
                .map(<[u8]>::to_vec)
        };

        let Some(raw) = raw else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        match Self::decode_entry(&raw) {
            Some((expires_at, payload)) if Utc::now().timestamp_millis() < expires_at => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(payload.to_vec()))
            }
            // Past deadline or undecodable: drop it and report a miss.
            _ => {
                if let Err(e) = self.remove_entry(encoded.as_bytes()) {
                    tracing::debug!(key = %encoded, error = %e, "failed to drop expired cache entry");
                } else {
                    self.expired.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> VaneResult<()> {
        let expires_at = Utc::now().timestamp_millis() + ttl.as_millis() as i64;
        let entry = Self::encode_entry(expires_at, value);

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        self.db
            .put(&mut wtxn, key.encode().as_bytes(), &entry)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> VaneResult<()> {
        self.remove_entry(key.encode().as_bytes())?;
        Ok(())
    }

    async fn stats(&self) -> VaneResult<CacheStats> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        let entry_count = self
            .db
            .len(&rtxn)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count,
            expired: self.expired.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vane_core::new_location_id;

    fn open_cache() -> (TempDir, LmdbCache) {
        let dir = TempDir::new().unwrap();
        let cache = LmdbCache::new(dir.path(), 10).unwrap();
        (dir, cache)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_payload() {
        let (_dir, cache) = open_cache();
        let key = CacheKey::Weather(new_location_id());
        cache
            .set_with_ttl(&key, b"{\"temp\":20.5}", Duration::from_secs(600))
            .await
            .unwrap();
        assert_eq!(
            cache.get(&key).await.unwrap(),
            Some(b"{\"temp\":20.5}".to_vec())
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_immediately_expired() {
        let (_dir, cache) = open_cache();
        let key = CacheKey::Locations;
        cache
            .set_with_ttl(&key, b"[]", Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.entry_count, 0);
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let (_dir, cache) = open_cache();
        let key = CacheKey::Location(new_location_id());
        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let (_dir, cache) = open_cache();
        let key = CacheKey::Location(new_location_id());
        cache
            .set_with_ttl(&key, b"rec", Duration::from_secs(600))
            .await
            .unwrap();
        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let key = CacheKey::Weather(new_location_id());
        {
            let cache = LmdbCache::new(dir.path(), 10).unwrap();
            cache
                .set_with_ttl(&key, b"persisted", Duration::from_secs(600))
                .await
                .unwrap();
        }
        let cache = LmdbCache::new(dir.path(), 10).unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"persisted".to_vec()));
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let (_dir, cache) = open_cache();
        let key = CacheKey::Locations;
        cache.get(&key).await.unwrap();
        cache
            .set_with_ttl(&key, b"[]", Duration::from_secs(600))
            .await
            .unwrap();
        cache.get(&key).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_entry_codec_round_trips() {
        let encoded = LmdbCache::encode_entry(1_700_000_000_000, b"payload");
        let (expires_at, payload) = LmdbCache::decode_entry(&encoded).unwrap();
        assert_eq!(expires_at, 1_700_000_000_000);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn test_decode_rejects_truncated_entries() {
        assert!(LmdbCache::decode_entry(b"short").is_none());
        assert!(LmdbCache::decode_entry(&[]).is_none());
    }
}
