//! OpenAPI Specification for the Vane API
//!
//! This module defines the OpenAPI document for the Vane REST API.
//! It uses utoipa to generate the OpenAPI specification from Rust types
//! and route annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, locations, weather};
use crate::telemetry::metrics;

use vane_core::{DaySummary, GeoCity, Location, LocationFields, WeatherSnapshot};

/// OpenAPI document for the Vane API.
///
/// Generates the complete specification for the REST surface, including
/// all schemas and paths.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vane API",
        version = "0.3.0",
        description = "Location-backed weather reads with cache-aside storage",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Locations", description = "Tracked location management"),
        (name = "Weather", description = "Current conditions and day-by-day history"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    ),
    paths(
        // === Location Routes ===
        locations::list_locations,
        locations::create_location,
        locations::get_location,
        locations::update_location,
        locations::delete_location,

        // === Weather Routes ===
        weather::get_current_weather,
        weather::get_weather_history,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,

        // === Observability ===
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Request Types ===
            locations::CreateLocationRequest, locations::UpdateLocationRequest,
            weather::HistoryParams,

            // === Health Types ===
            health::HealthResponse, health::HealthStatus,
            health::HealthDetails, health::ComponentHealth,

            // === Core Domain Types (from vane-core) ===
            Location, LocationFields, GeoCity, WeatherSnapshot, DaySummary,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();

        // Verify basic structure
        assert_eq!(openapi.info.title, "Vane API");
        assert_eq!(openapi.info.version, env!("CARGO_PKG_VERSION"));

        // Verify servers
        let servers = openapi
            .servers
            .as_ref()
            .ok_or_else(|| "OpenAPI servers missing".to_string())?;
        assert_eq!(servers.len(), 1);

        // Verify tags exist
        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 4);
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;

        // Verify it's valid JSON by parsing it back
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;

        // Verify key fields are present (allow for spacing variations)
        assert!(json.contains("Vane API"));
        assert!(json.contains("\"Locations\""));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();

        // Verify paths are populated
        assert!(!openapi.paths.paths.is_empty());

        // Verify key paths exist
        assert!(openapi.paths.paths.contains_key("/locations"));
        assert!(openapi.paths.paths.contains_key("/locations/{id}"));
        assert!(openapi.paths.paths.contains_key("/weather/{id}"));
        assert!(openapi.paths.paths.contains_key("/weather/history/{id}"));
        assert!(openapi.paths.paths.contains_key("/health/ready"));
        assert!(openapi.paths.paths.contains_key("/metrics"));
    }

    #[test]
    fn test_error_schema_is_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components missing");
        assert!(components.schemas.contains_key("ApiError"));
        assert!(components.schemas.contains_key("ErrorCode"));
        assert!(components.schemas.contains_key("Location"));
    }
}
