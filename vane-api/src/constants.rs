//! Constants for the Vane API
//!
//! This module contains all constant values used throughout the API.
//! Centralizing constants makes them easy to find, modify, and test.

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// RATE LIMITING
// ============================================================================

/// Default rate limit per client IP (requests per minute)
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Default burst size for rate limiting
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host for the HTTP server
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 3000;

/// Default timeout for a single request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults_are_sane() {
        assert!(DEFAULT_RATE_LIMIT_PER_MINUTE > 0);
        assert!(DEFAULT_RATE_LIMIT_BURST <= DEFAULT_RATE_LIMIT_PER_MINUTE);
    }

    #[test]
    fn test_cors_max_age_is_one_day() {
        assert_eq!(DEFAULT_CORS_MAX_AGE_SECS, 24 * 60 * 60);
    }
}
