//! Vane Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types and the shared error taxonomy -
//! no business logic, no I/O.

pub mod entities;
pub mod error;
pub mod identity;

pub use entities::{DaySummary, GeoCity, Location, LocationFields, WeatherSnapshot};
pub use error::{VaneError, VaneResult};
pub use identity::{new_location_id, parse_location_id, LocationId, Timestamp};
