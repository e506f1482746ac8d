//! Record store abstraction.
//!
//! The store owns durable location records and is the single source of
//! truth; the cache layer above it is free to drop anything at any time.
//! The Postgres implementation lives in vane-api next to its pool wiring.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vane_core::{Location, LocationFields, LocationId, VaneResult};

/// Durable storage for location records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored location, ordered by id (UUIDv7, so creation order).
    async fn find_all(&self) -> VaneResult<Vec<Location>>;

    async fn find_by_id(&self, id: LocationId) -> VaneResult<Option<Location>>;

    /// Insert a new record. The store assigns the id and timestamps.
    async fn create(&self, fields: LocationFields) -> VaneResult<Location>;

    /// Replace the caller-supplied fields wholesale. `None` when no record
    /// exists for the id.
    async fn update_by_id(
        &self,
        id: LocationId,
        fields: LocationFields,
    ) -> VaneResult<Option<Location>>;

    /// Remove a record, reporting whether one existed.
    async fn delete_by_id(&self, id: LocationId) -> VaneResult<bool>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> VaneResult<()> {
        Ok(())
    }
}

/// In-memory [`RecordStore`] for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<LocationId, Location>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prebuilt record, keeping its id. Fixture seam for tests.
    pub async fn insert(&self, location: Location) {
        self.records.write().await.insert(location.id, location);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_all(&self) -> VaneResult<Vec<Location>> {
        let mut all: Vec<Location> = self.records.read().await.values().cloned().collect();
        all.sort_by_key(|l| l.id);
        Ok(all)
    }

    async fn find_by_id(&self, id: LocationId) -> VaneResult<Option<Location>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn create(&self, fields: LocationFields) -> VaneResult<Location> {
        let location = Location::new(fields.name, fields.latitude, fields.longitude);
        self.records
            .write()
            .await
            .insert(location.id, location.clone());
        Ok(location)
    }

    async fn update_by_id(
        &self,
        id: LocationId,
        fields: LocationFields,
    ) -> VaneResult<Option<Location>> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(location) => {
                location.apply(fields);
                Ok(Some(location.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: LocationId) -> VaneResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vane_core::new_location_id;

    fn fields(name: &str, lat: f64, lon: f64) -> LocationFields {
        LocationFields {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let store = MemoryRecordStore::new();
        let a = store.create(fields("Paris", 48.8566, 2.3522)).await.unwrap();
        let b = store.create(fields("Lyon", 45.7640, 4.8357)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_all_orders_by_creation() {
        let store = MemoryRecordStore::new();
        let a = store.create(fields("Paris", 48.8566, 2.3522)).await.unwrap();
        let b = store.create(fields("Lyon", 45.7640, 4.8357)).await.unwrap();
        let c = store.create(fields("Nice", 43.7102, 7.2620)).await.unwrap();

        let all = store.find_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_find_by_id_misses_unknown() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.find_by_id(new_location_id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_id() {
        let store = MemoryRecordStore::new();
        let created = store.create(fields("Paris", 48.8566, 2.3522)).await.unwrap();

        let updated = store
            .update_by_id(created.id, fields("Paris 2", 48.9, 2.4))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Paris 2");
        assert_eq!(
            store.find_by_id(created.id).await.unwrap().unwrap().name,
            "Paris 2"
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_none() {
        let store = MemoryRecordStore::new();
        let result = store
            .update_by_id(new_location_id(), fields("Ghost", 0.0, 0.0))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryRecordStore::new();
        let created = store.create(fields("Paris", 48.8566, 2.3522)).await.unwrap();

        assert!(store.delete_by_id(created.id).await.unwrap());
        assert!(!store.delete_by_id(created.id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ping_defaults_to_ok() {
        let store = MemoryRecordStore::new();
        assert!(store.ping().await.is_ok());
    }
}
