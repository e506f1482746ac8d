//! HTTP middleware for the Vane API.
//!
//! The observability middleware lives in [`crate::telemetry`] next to the
//! metrics it records; this module holds middleware that shapes traffic.

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimitError, RateLimitState};
