//! Vane API - REST layer for the weather location service
//!
//! This crate exposes location CRUD, current weather, and multi-day weather
//! history over HTTP (Axum). Reads are served through the shared
//! read-through cache; writes invalidate the affected keys. The record
//! store is PostgreSQL in production and an in-memory store for local
//! development and tests.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod macros;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbConfig, PgRecordStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{rate_limit_middleware, RateLimitState};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use telemetry::{init_tracer, TelemetryConfig};
