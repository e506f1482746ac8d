//! Deterministic cache key construction.
//!
//! Every cached value lives under exactly one key shape, and the same
//! logical request always encodes to the same string. Handlers never
//! concatenate key strings by hand; they go through [`CacheKey`] so the
//! namespaces stay disjoint.

use std::fmt;

use chrono::NaiveDate;
use vane_core::LocationId;

/// The full set of key shapes the service caches under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The list of all tracked locations.
    Locations,
    /// A single location record.
    Location(LocationId),
    /// Current weather for a location.
    Weather(LocationId),
    /// One day of weather history for a location.
    WeatherHistory(LocationId, NaiveDate),
}

impl CacheKey {
    /// Encode to the canonical string form used by every backend.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse a canonical key string back into its shape.
    ///
    /// Returns `None` for strings no [`CacheKey`] would ever produce, so
    /// backends can skip foreign entries when scanning a shared database.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "locations" {
            return Some(Self::Locations);
        }
        let (prefix, rest) = raw.split_once(':')?;
        match prefix {
            "location" => rest.parse().ok().map(Self::Location),
            "weather" => rest.parse().ok().map(Self::Weather),
            "weatherHistory" => {
                let (id, date) = rest.split_once(':')?;
                let id: LocationId = id.parse().ok()?;
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some(Self::WeatherHistory(id, date))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locations => write!(f, "locations"),
            Self::Location(id) => write!(f, "location:{id}"),
            Self::Weather(id) => write!(f, "weather:{id}"),
            // NaiveDate displays as ISO-8601 (YYYY-MM-DD)
            Self::WeatherHistory(id, date) => write!(f, "weatherHistory:{id}:{date}"),
        }
    }
}
