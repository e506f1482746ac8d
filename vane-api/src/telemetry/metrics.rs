//! Prometheus Metrics Definitions
//!
//! Defines all Vane metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping. Cache gauges are
//! refreshed from the cache backend at scrape time rather than on every
//! request.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use vane_service::LocationWeatherService;
use vane_storage::CacheStats;

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<VaneMetrics>> = Lazy::new(VaneMetrics::new);

/// Container for all Vane metrics.
#[derive(Clone)]
pub struct VaneMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Cache hits since process start
    pub cache_hits: Gauge,

    /// Cache misses since process start
    pub cache_misses: Gauge,

    /// Entries evicted because their TTL had passed
    pub cache_expired: Gauge,

    /// Live entries currently held by the cache backend
    pub cache_entries: Gauge,
}

impl VaneMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "vane_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_requests_total: {}", e))
            })?,

            http_request_duration_seconds: register_histogram_vec!(
                "vane_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| {
                ApiError::internal_error(format!(
                    "Failed to register http_request_duration_seconds: {}",
                    e
                ))
            })?,

            cache_hits: register_gauge!("vane_cache_hits", "Cache hits since process start")
                .map_err(|e| {
                    ApiError::internal_error(format!("Failed to register cache_hits: {}", e))
                })?,

            cache_misses: register_gauge!("vane_cache_misses", "Cache misses since process start")
                .map_err(|e| {
                    ApiError::internal_error(format!("Failed to register cache_misses: {}", e))
                })?,

            cache_expired: register_gauge!(
                "vane_cache_expired",
                "Entries dropped because their TTL had passed"
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register cache_expired: {}", e))
            })?,

            cache_entries: register_gauge!(
                "vane_cache_entries",
                "Live entries currently held by the cache backend"
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register cache_entries: {}", e))
            })?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Refresh the cache gauges from a stats snapshot.
    pub fn set_cache_stats(&self, stats: &CacheStats) {
        self.cache_hits.set(stats.hits as f64);
        self.cache_misses.set(stats.misses as f64);
        self.cache_expired.set(stats.expired as f64);
        self.cache_entries.set(stats.entry_count as f64);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics. Cache gauges are refreshed
/// from the cache backend before encoding; a failing backend leaves the
/// previous gauge values in place.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler(
    State(service): State<Arc<LocationWeatherService>>,
) -> impl IntoResponse {
    if let Ok(metrics) = METRICS.as_ref() {
        match service.cache_stats().await {
            Ok(stats) => metrics.set_cache_stats(&stats),
            Err(e) => tracing::warn!(error = %e, "Cache stats unavailable for scrape"),
        }
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
