//! Core entity structures

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{new_location_id, LocationId, Timestamp};

/// A tracked location - the unit of record for the service.
///
/// Coordinates are resolved once at creation time by the geocoding provider
/// and stored alongside the canonical city name it returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Location {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: LocationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Location {
    /// Build a new location with a fresh UUIDv7 id and current timestamps.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        let now = Utc::now();
        Self {
            id: new_location_id(),
            name: name.into(),
            latitude,
            longitude,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable fields wholesale, bumping `updated_at`.
    pub fn apply(&mut self, fields: LocationFields) {
        self.name = fields.name;
        self.latitude = fields.latitude;
        self.longitude = fields.longitude;
        self.updated_at = Utc::now();
    }
}

/// The caller-supplied portion of a location.
///
/// Updates replace these fields as a unit; there is no partial patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LocationFields {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Canonical geocoding answer for a city query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeoCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions for a location, passed through from the provider.
///
/// The payload is deliberately opaque: the service caches and serves it
/// verbatim and never interprets individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = Object))]
pub struct WeatherSnapshot(pub serde_json::Value);

impl WeatherSnapshot {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Aggregated conditions for one calendar day, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = Object))]
pub struct DaySummary(pub serde_json::Value);

impl DaySummary {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_new_assigns_id_and_timestamps() {
        let loc = Location::new("Paris", 48.8566, 2.3522);
        assert_eq!(loc.id.get_version_num(), 7);
        assert_eq!(loc.name, "Paris");
        assert_eq!(loc.created_at, loc.updated_at);
    }

    #[test]
    fn test_location_apply_replaces_fields_wholesale() {
        let mut loc = Location::new("Paris", 48.8566, 2.3522);
        let id = loc.id;
        let created = loc.created_at;
        loc.apply(LocationFields {
            name: "Lyon".to_string(),
            latitude: 45.7640,
            longitude: 4.8357,
        });
        assert_eq!(loc.id, id);
        assert_eq!(loc.created_at, created);
        assert_eq!(loc.name, "Lyon");
        assert_eq!(loc.latitude, 45.7640);
        assert!(loc.updated_at >= created);
    }

    #[test]
    fn test_location_serde_round_trip() {
        let loc = Location::new("Paris", 48.8566, 2.3522);
        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
    }

    #[test]
    fn test_weather_snapshot_is_transparent() {
        let payload = json!({"temp": 21.5, "clouds": 40});
        let snapshot = WeatherSnapshot::new(payload.clone());
        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(encoded, payload);
        let back: WeatherSnapshot = serde_json::from_value(encoded).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_day_summary_is_transparent() {
        let payload = json!({"date": "2026-08-20", "temperature": {"max": 30.1}});
        let summary = DaySummary::new(payload.clone());
        assert_eq!(serde_json::to_value(&summary).unwrap(), payload);
    }
}
