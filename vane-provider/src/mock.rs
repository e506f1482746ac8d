//! Scripted in-memory provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use vane_core::{DaySummary, GeoCity, VaneError, VaneResult, WeatherSnapshot};

use crate::WeatherProvider;

/// Provider double with canned answers, switchable failures, per-day
/// delays, and call counters.
///
/// Geocoding answers are keyed by city name; unknown names resolve to
/// `Ok(None)` like a real geocoder that has never heard of the place.
/// Day summaries carry their date in the payload so callers can assert
/// on ordering.
#[derive(Default)]
pub struct MockWeatherProvider {
    cities: Mutex<HashMap<String, GeoCity>>,
    geocode_failure: Mutex<Option<String>>,
    current_failure: Mutex<Option<String>>,
    day_failures: Mutex<HashMap<NaiveDate, String>>,
    day_delays: Mutex<HashMap<NaiveDate, Duration>>,
    geocode_calls: AtomicUsize,
    current_calls: AtomicUsize,
    day_calls: AtomicUsize,
    requested_days: Mutex<Vec<NaiveDate>>,
    requested_countries: Mutex<Vec<String>>,
}

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_city`](Self::add_city).
    pub fn with_city(self, name: &str, latitude: f64, longitude: f64) -> Self {
        self.add_city(name, latitude, longitude);
        self
    }

    pub fn add_city(&self, name: &str, latitude: f64, longitude: f64) {
        self.cities.lock().unwrap().insert(
            name.to_string(),
            GeoCity {
                name: name.to_string(),
                latitude,
                longitude,
            },
        );
    }

    pub fn fail_geocode(&self, reason: &str) {
        *self.geocode_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn fail_current(&self, reason: &str) {
        *self.current_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn fail_day(&self, date: NaiveDate, reason: &str) {
        self.day_failures
            .lock()
            .unwrap()
            .insert(date, reason.to_string());
    }

    /// Make one day's summary resolve only after `delay`. Combined with a
    /// paused tokio clock this scrambles completion order deterministically.
    pub fn delay_day(&self, date: NaiveDate, delay: Duration) {
        self.day_delays.lock().unwrap().insert(date, delay);
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn day_calls(&self) -> usize {
        self.day_calls.load(Ordering::SeqCst)
    }

    /// Dates requested from [`fetch_day_summary`], in call order.
    pub fn requested_days(&self) -> Vec<NaiveDate> {
        self.requested_days.lock().unwrap().clone()
    }

    /// Country codes seen by [`geocode_city`], in call order.
    pub fn requested_countries(&self) -> Vec<String> {
        self.requested_countries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn geocode_city(&self, name: &str, country_code: &str) -> VaneResult<Option<GeoCity>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_countries
            .lock()
            .unwrap()
            .push(country_code.to_string());
        if let Some(reason) = self.geocode_failure.lock().unwrap().clone() {
            return Err(VaneError::upstream(Some(503), reason));
        }
        Ok(self.cities.lock().unwrap().get(name).cloned())
    }

    async fn fetch_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> VaneResult<WeatherSnapshot> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.current_failure.lock().unwrap().clone() {
            return Err(VaneError::upstream(Some(503), reason));
        }
        Ok(WeatherSnapshot::new(json!({
            "lat": latitude,
            "lon": longitude,
            "current": {"temp": 20.0, "clouds": 10},
            "source": "mock",
        })))
    }

    async fn fetch_day_summary(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> VaneResult<DaySummary> {
        self.day_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_days.lock().unwrap().push(date);

        let delay = self.day_delays.lock().unwrap().get(&date).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.day_failures.lock().unwrap().get(&date).cloned();
        if let Some(reason) = failure {
            return Err(VaneError::upstream(Some(503), reason));
        }

        Ok(DaySummary::new(json!({
            "date": date.format("%Y-%m-%d").to_string(),
            "lat": latitude,
            "lon": longitude,
            "temperature": {"min": 15.0, "max": 25.0},
        })))
    }
}
