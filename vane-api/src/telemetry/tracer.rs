//! Tracing Subscriber Initialization
//!
//! Sets up structured logging for the API process. Output is JSON in
//! production (one object per line, ready for log shippers) and
//! human-readable text for local development.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name included in startup logs
    pub service_name: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Emit JSON log lines instead of human-readable output
    pub log_json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("VANE_SERVICE_NAME")
                .unwrap_or_else(|_| "vane-api".to_string()),
            environment: std::env::var("VANE_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_json: std::env::var("VANE_LOG_JSON")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// This function should be called once at application startup before any
/// tracing occurs. The filter comes from `RUST_LOG` when set, with a
/// default that keeps vane crates at debug and everything else at info.
pub fn init_tracer(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vane_api=debug,vane_service=debug,info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;
    }

    tracing::info!(
        service_name = config.service_name,
        environment = config.environment,
        log_json = config.log_json,
        "Telemetry initialized"
    );

    Ok(())
}
