//! Location and weather orchestration.
//!
//! [`LocationWeatherService`] is the single entry point the API layer
//! calls. It owns the cross-cutting rules: validate caller input before
//! any I/O, resolve reads through the cache, invalidate (never repopulate)
//! on writes, and treat the record store as the sole source of truth for
//! which locations exist.

use std::sync::Arc;

use vane_core::{
    parse_location_id, DaySummary, Location, LocationFields, LocationId, VaneError, VaneResult,
    WeatherSnapshot,
};
use vane_provider::WeatherProvider;
use vane_storage::{CacheKey, CacheStats, ReadThroughCache, RecordStore};

use crate::history::HistoryAggregator;

/// Country scope applied to every geocoding query.
pub const DEFAULT_COUNTRY_CODE: &str = "US";

pub struct LocationWeatherService {
    store: Arc<dyn RecordStore>,
    provider: Arc<dyn WeatherProvider>,
    cache: ReadThroughCache,
    history: HistoryAggregator,
    country_code: String,
}

impl LocationWeatherService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        provider: Arc<dyn WeatherProvider>,
        cache: ReadThroughCache,
    ) -> Self {
        let history = HistoryAggregator::new(cache.clone(), Arc::clone(&provider));
        Self {
            store,
            provider,
            cache,
            history,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    pub fn with_max_history_days(mut self, days: u32) -> Self {
        self.history.set_max_window(days);
        self
    }

    /// List every tracked location, cache-aside under the collection key.
    pub async fn list_locations(&self) -> VaneResult<Vec<Location>> {
        let store = Arc::clone(&self.store);
        self.cache
            .get_or_load(&CacheKey::Locations, move || async move {
                store.find_all().await
            })
            .await
    }

    /// Geocode a city and create a record from the canonical answer.
    ///
    /// An unknown city is a [`VaneError::CityNotFound`] outcome: nothing
    /// is created and nothing is cached. Geocoder trouble propagates as
    /// [`VaneError::UpstreamUnavailable`] untouched.
    pub async fn add_location(&self, city: &str) -> VaneResult<Location> {
        let geo = self
            .provider
            .geocode_city(city, &self.country_code)
            .await?;
        let Some(geo) = geo else {
            tracing::info!(city, "geocoder found no match");
            return Err(VaneError::city_not_found(city));
        };

        let location = self
            .store
            .create(LocationFields {
                name: geo.name,
                latitude: geo.latitude,
                longitude: geo.longitude,
            })
            .await?;

        // The collection snapshot is now stale.
        self.cache.invalidate(&CacheKey::Locations).await;
        tracing::info!(id = %location.id, name = %location.name, "location added");
        Ok(location)
    }

    /// Fetch one location, cache-aside under its record key.
    pub async fn get_location(&self, id: &str) -> VaneResult<Location> {
        let id = parse_location_id(id)?;
        let store = Arc::clone(&self.store);
        self.cache
            .get_or_load(&CacheKey::Location(id), move || async move {
                store
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| VaneError::not_found(id))
            })
            .await
    }

    /// Replace a location's fields wholesale, then invalidate its keys.
    pub async fn update_location(&self, id: &str, fields: LocationFields) -> VaneResult<Location> {
        let id = parse_location_id(id)?;
        let updated = self
            .store
            .update_by_id(id, fields)
            .await?
            .ok_or_else(|| VaneError::not_found(id))?;

        self.invalidate_record_keys(id).await;
        tracing::info!(id = %id, "location updated");
        Ok(updated)
    }

    /// Delete a location and invalidate its keys. Deleting an id with no
    /// record is [`VaneError::NotFound`]; the cache is left untouched.
    pub async fn delete_location(&self, id: &str) -> VaneResult<()> {
        let id = parse_location_id(id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(VaneError::not_found(id));
        }

        self.invalidate_record_keys(id).await;
        tracing::info!(id = %id, "location deleted");
        Ok(())
    }

    /// Current conditions for a location, cache-aside under its weather
    /// key. The record store decides existence on every miss, so weather
    /// for a deleted location dies with its cache entry.
    pub async fn get_current_weather(&self, id: &str) -> VaneResult<WeatherSnapshot> {
        let id = parse_location_id(id)?;
        let store = Arc::clone(&self.store);
        let provider = Arc::clone(&self.provider);
        self.cache
            .get_or_load(&CacheKey::Weather(id), move || async move {
                let location = store
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| VaneError::not_found(id))?;
                provider
                    .fetch_current_weather(location.latitude, location.longitude)
                    .await
            })
            .await
    }

    /// Day summaries for the last `days` days, most recent first.
    ///
    /// Both arguments are validated before any store, cache, or provider
    /// access. The fan-out itself lives in [`HistoryAggregator`].
    pub async fn get_weather_history(&self, id: &str, days: i64) -> VaneResult<Vec<DaySummary>> {
        let id = parse_location_id(id)?;
        let window = self.history.validate_window(days)?;

        let location = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| VaneError::not_found(id))?;

        self.history.collect(&location, window).await
    }

    /// Cache counters for the metrics endpoint.
    pub async fn cache_stats(&self) -> VaneResult<CacheStats> {
        self.cache.stats().await
    }

    /// Readiness probe passthrough to the record store.
    pub async fn store_ping(&self) -> VaneResult<()> {
        self.store.ping().await
    }

    async fn invalidate_record_keys(&self, id: LocationId) {
        self.cache
            .invalidate_all(&[
                CacheKey::Location(id),
                CacheKey::Weather(id),
                CacheKey::Locations,
            ])
            .await;
    }
}
