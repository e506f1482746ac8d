//! Error taxonomy for vane operations
//!
//! Every fallible operation in the workspace returns [`VaneResult`]. The
//! variants separate caller mistakes from dependency outages so the API
//! boundary can map each to a stable status code without string matching.

use thiserror::Error;

use crate::LocationId;

/// Unified error type for all vane operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaneError {
    /// The caller supplied input outside the contract (malformed id,
    /// non-positive day count, blank city name).
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// No location record exists for the id.
    #[error("Location not found for id: {id}")]
    NotFound { id: LocationId },

    /// The geocoder answered but knows no such city. A valid outcome, not
    /// a provider failure: nothing is created and nothing is cached.
    #[error("No match found for city: {city}")]
    CityNotFound { city: String },

    /// The upstream provider failed or answered with a non-success status.
    #[error("Upstream weather provider unavailable: {reason}")]
    UpstreamUnavailable { status: Option<u16>, reason: String },

    /// Cache backend failure that escaped the fail-open path.
    #[error("Cache backend failure: {reason}")]
    Cache { reason: String },

    /// Record store failure (connection, query, pool exhaustion).
    #[error("Record store failure: {reason}")]
    Store { reason: String },

    /// Invalid or missing configuration at startup.
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl VaneError {
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
        }
    }

    pub fn not_found(id: LocationId) -> Self {
        Self::NotFound { id }
    }

    pub fn city_not_found(city: impl Into<String>) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    pub fn upstream(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            status,
            reason: reason.into(),
        }
    }

    pub fn cache(reason: impl Into<String>) -> Self {
        Self::Cache {
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Result alias used across the workspace.
pub type VaneResult<T> = Result<T, VaneError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_location_id;

    #[test]
    fn test_invalid_payload_display() {
        let err = VaneError::invalid_payload("days must be a positive integer");
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid payload"));
        assert!(msg.contains("days must be a positive integer"));
    }

    #[test]
    fn test_not_found_display_includes_id() {
        let id = new_location_id();
        let err = VaneError::not_found(id);
        let msg = format!("{}", err);
        assert!(msg.contains("Location not found for id"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_city_not_found_display() {
        let err = VaneError::city_not_found("Qwxyzplace");
        let msg = format!("{}", err);
        assert!(msg.contains("No match found for city"));
        assert!(msg.contains("Qwxyzplace"));
    }

    #[test]
    fn test_upstream_display_keeps_reason() {
        let err = VaneError::upstream(Some(502), "bad gateway");
        let msg = format!("{}", err);
        assert!(msg.contains("Upstream weather provider unavailable"));
        assert!(msg.contains("bad gateway"));
        assert!(matches!(
            err,
            VaneError::UpstreamUnavailable {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn test_helper_constructors_build_expected_variants() {
        assert!(matches!(
            VaneError::cache("lmdb write failed"),
            VaneError::Cache { .. }
        ));
        assert!(matches!(
            VaneError::store("pool exhausted"),
            VaneError::Store { .. }
        ));
        assert!(matches!(
            VaneError::config("WEATHER_API_KEY is not set"),
            VaneError::Config { .. }
        ));
    }

    #[test]
    fn test_errors_are_comparable() {
        let a = VaneError::city_not_found("Qwxyzplace");
        let b = VaneError::city_not_found("Qwxyzplace");
        assert_eq!(a, b);
    }
}
