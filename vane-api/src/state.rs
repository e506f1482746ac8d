//! Shared application state for Axum routers.

use std::sync::Arc;

use vane_service::LocationWeatherService;

use crate::config::ApiConfig;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Orchestration layer for location, weather, and history operations.
    ///
    /// Routes go through the service rather than the store or cache
    /// directly so the caching and invalidation rules live in one place.
    pub service: Arc<LocationWeatherService>,
    pub config: Arc<ApiConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(service: Arc<LocationWeatherService>, config: ApiConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(Arc<LocationWeatherService>, service);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(std::time::Instant, start_time);
