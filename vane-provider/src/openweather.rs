//! OpenWeather HTTP client.
//!
//! Talks to three OpenWeather endpoints: direct geocoding, the One Call
//! current conditions feed, and the One Call day summary. Responses from
//! the weather endpoints are kept as raw JSON; only the geocoder response
//! is given a shape, and only to pull out name and coordinates.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use vane_core::{DaySummary, GeoCity, VaneError, VaneResult, WeatherSnapshot};

use crate::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const GEOCODE_ENDPOINT: &str = "geo/1.0/direct";
const CURRENT_ENDPOINT: &str = "data/3.0/onecall";
const DAY_SUMMARY_ENDPOINT: &str = "data/3.0/onecall/day_summary";

/// Error bodies can be arbitrarily large; keep only the head for logs
/// and error messages.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Connection settings for [`OpenWeatherClient`].
#[derive(Clone)]
pub struct OpenWeatherConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from the environment.
    ///
    /// `WEATHER_API_KEY` is required. `OPEN_WEATHER_BASE_URL` and
    /// `OPEN_WEATHER_TIMEOUT_SECS` override the defaults.
    pub fn from_env() -> VaneResult<Self> {
        let api_key = std::env::var("WEATHER_API_KEY")
            .map_err(|_| VaneError::config("WEATHER_API_KEY is not set"))?;
        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var("OPEN_WEATHER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(raw) = std::env::var("OPEN_WEATHER_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                VaneError::config(format!("OPEN_WEATHER_TIMEOUT_SECS must be an integer, got {raw:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for OpenWeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One row of the direct geocoding response.
#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
}

fn first_geo_match(entries: Vec<GeoEntry>) -> Option<GeoCity> {
    entries.into_iter().next().map(|entry| GeoCity {
        name: entry.name,
        latitude: entry.lat,
        longitude: entry.lon,
    })
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// OpenWeather API client.
pub struct OpenWeatherClient {
    client: Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> VaneResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VaneError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> VaneResult<Self> {
        Self::new(OpenWeatherConfig::from_env()?)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Make an API request, appending the API key.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> VaneResult<T> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(endpoint, "requesting upstream weather data");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("appid", &self.config.api_key)])
            .send()
            .await
            .map_err(|e| VaneError::upstream(None, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status = status.as_u16(), "upstream returned error status");
            return Err(VaneError::upstream(
                Some(status.as_u16()),
                format!("Status {}: {}", status.as_u16(), truncate_body(&body)),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| VaneError::upstream(None, format!("Invalid response body: {e}")))
    }
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.config.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn geocode_city(&self, name: &str, country_code: &str) -> VaneResult<Option<GeoCity>> {
        let query = [
            ("q", format!("{name},{country_code}")),
            ("limit", "1".to_string()),
        ];
        let entries: Vec<GeoEntry> = self.get_json(GEOCODE_ENDPOINT, &query).await?;
        Ok(first_geo_match(entries))
    }

    async fn fetch_current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> VaneResult<WeatherSnapshot> {
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
        ];
        let payload: serde_json::Value = self.get_json(CURRENT_ENDPOINT, &query).await?;
        Ok(WeatherSnapshot::new(payload))
    }

    async fn fetch_day_summary(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> VaneResult<DaySummary> {
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ];
        let payload: serde_json::Value = self.get_json(DAY_SUMMARY_ENDPOINT, &query).await?;
        Ok(DaySummary::new(payload))
    }
}
