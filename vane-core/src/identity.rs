//! Identity types shared across the workspace.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::VaneError;

/// Location identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type LocationId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 LocationId (timestamp-sortable).
pub fn new_location_id() -> LocationId {
    Uuid::now_v7()
}

/// Parse a caller-supplied location id.
///
/// Identifiers cross the API boundary as strings, so every operation that
/// takes one validates it here before touching cache or store.
pub fn parse_location_id(raw: &str) -> Result<LocationId, VaneError> {
    Uuid::parse_str(raw).map_err(|_| VaneError::InvalidPayload {
        reason: format!("malformed location id: {raw}"),
    })
}
