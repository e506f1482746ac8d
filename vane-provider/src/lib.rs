//! Vane Provider - Upstream Weather Source
//!
//! Defines the provider abstraction the service layer talks to and the
//! OpenWeather implementation of it. The provider is treated as a black
//! box: payloads pass through opaquely, failures surface as
//! `UpstreamUnavailable` with the provider's own words, and nothing here
//! retries or interprets weather data.

pub mod mock;
pub mod openweather;

use async_trait::async_trait;
use chrono::NaiveDate;
use vane_core::{DaySummary, GeoCity, VaneResult, WeatherSnapshot};

pub use mock::MockWeatherProvider;
pub use openweather::{OpenWeatherClient, OpenWeatherConfig};

/// Upstream geocoding and weather source.
///
/// Implementations must distinguish "the provider answered and knows no
/// such city" (`Ok(None)` from [`geocode_city`](Self::geocode_city)) from
/// "the provider could not answer" (`Err`). The service layer depends on
/// that split to keep unknown cities out of the record store without
/// masking outages.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a city name to canonical coordinates, scoped to a country.
    async fn geocode_city(&self, name: &str, country_code: &str) -> VaneResult<Option<GeoCity>>;

    /// Current conditions at a coordinate pair, passed through verbatim.
    async fn fetch_current_weather(&self, latitude: f64, longitude: f64)
        -> VaneResult<WeatherSnapshot>;

    /// Aggregated conditions for one calendar day, passed through verbatim.
    async fn fetch_day_summary(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> VaneResult<DaySummary>;
}
