//! Vane Test Utilities
//!
//! Centralized test infrastructure for the vane workspace:
//! - Call-counting record store for proving which layers ran
//! - Cache backend with switchable failure modes for fail-open tests
//! - Fixture builders for common entities

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

// Re-export doubles from their source crates
pub use vane_provider::MockWeatherProvider;
pub use vane_storage::{InMemoryCache, MemoryRecordStore};

// Re-export core types for convenience
pub use vane_core::{
    new_location_id, parse_location_id, DaySummary, GeoCity, Location, LocationFields,
    LocationId, Timestamp, VaneError, VaneResult, WeatherSnapshot,
};
use vane_storage::{CacheKey, CacheStats, CacheStore, RecordStore};

/// Build a location fixture with a fresh id.
pub fn sample_location(name: &str, latitude: f64, longitude: f64) -> Location {
    Location::new(name, latitude, longitude)
}

/// Build the caller-supplied field set.
pub fn sample_fields(name: &str, latitude: f64, longitude: f64) -> LocationFields {
    LocationFields {
        name: name.to_string(),
        latitude,
        longitude,
    }
}

// ============================================================================
// COUNTING RECORD STORE
// ============================================================================

/// [`RecordStore`] wrapper that counts every call.
///
/// Validation tests depend on these counters to prove that bad input is
/// rejected before any store access happens.
#[derive(Default)]
pub struct CountingRecordStore {
    inner: MemoryRecordStore,
    find_all_calls: AtomicUsize,
    find_by_id_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl CountingRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a prebuilt record, bypassing the counters.
    pub async fn seed(&self, location: Location) {
        self.inner.insert(location).await;
    }

    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    pub fn find_by_id_calls(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.find_all_calls()
            + self.find_by_id_calls()
            + self.create_calls()
            + self.update_calls()
            + self.delete_calls()
    }
}

#[async_trait]
impl RecordStore for CountingRecordStore {
    async fn find_all(&self) -> VaneResult<Vec<Location>> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: LocationId) -> VaneResult<Option<Location>> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn create(&self, fields: LocationFields) -> VaneResult<Location> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(fields).await
    }

    async fn update_by_id(
        &self,
        id: LocationId,
        fields: LocationFields,
    ) -> VaneResult<Option<Location>> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update_by_id(id, fields).await
    }

    async fn delete_by_id(&self, id: LocationId) -> VaneResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(id).await
    }
}

// ============================================================================
// FLAKY CACHE STORE
// ============================================================================

/// [`CacheStore`] double with switchable failure modes, call counters, and
/// a log of deleted keys.
///
/// Backed by a real map so the non-failing paths behave like a cache; the
/// failure switches flip individual operations into errors to exercise
/// the fail-open contract.
#[derive(Default)]
pub struct FlakyCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
    fail_deletes: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    deleted_keys: Mutex<Vec<String>>,
}

impl FlakyCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self) {
        self.fail_sets.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Fail every operation at once.
    pub fn fail_everything(&self) {
        self.fail_gets();
        self.fail_sets();
        self.fail_deletes();
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Encoded keys passed to successful or failing deletes, in order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted_keys.lock().unwrap().clone()
    }

    /// True when an entry currently exists under the key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key.encode())
    }

    /// Entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for FlakyCacheStore {
    async fn get(&self, key: &CacheKey) -> VaneResult<Option<Vec<u8>>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(VaneError::cache("scripted get failure"));
        }
        Ok(self.entries.lock().unwrap().get(&key.encode()).cloned())
    }

    async fn set_with_ttl(&self, key: &CacheKey, value: &[u8], _ttl: Duration) -> VaneResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(VaneError::cache("scripted set failure"));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.encode(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> VaneResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted_keys.lock().unwrap().push(key.encode());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(VaneError::cache("scripted delete failure"));
        }
        self.entries.lock().unwrap().remove(&key.encode());
        Ok(())
    }

    async fn stats(&self) -> VaneResult<CacheStats> {
        Ok(CacheStats {
            entry_count: self.len() as u64,
            ..Default::default()
        })
    }
}
