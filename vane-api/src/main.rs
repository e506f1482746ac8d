//! Vane API Server Entry Point
//!
//! Bootstraps telemetry and configuration, selects the record store and
//! cache backends, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use vane_core::VaneError;
use vane_provider::OpenWeatherClient;
use vane_service::LocationWeatherService;
use vane_storage::{
    CacheConfig, CacheStore, InMemoryCache, LmdbCache, MemoryRecordStore, ReadThroughCache,
    RecordStore,
};

use vane_api::constants::{DEFAULT_BIND_HOST, DEFAULT_PORT};
use vane_api::telemetry::{init_tracer, TelemetryConfig};
use vane_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbConfig, PgRecordStore,
};

const DEFAULT_CACHE_SIZE_MB: usize = 64;

#[tokio::main]
async fn main() -> ApiResult<()> {
    dotenvy::dotenv().ok();

    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let store = build_record_store().await?;
    let cache = build_cache()?;
    let provider = Arc::new(OpenWeatherClient::from_env()?);

    let mut service = LocationWeatherService::new(store, provider, cache);
    if let Ok(code) = std::env::var("OPEN_WEATHER_COUNTRY_CODE") {
        service = service.with_country_code(code);
    }
    if let Ok(raw) = std::env::var("VANE_HISTORY_MAX_DAYS") {
        let days = raw.parse::<u32>().map_err(|_| {
            ApiError::invalid_payload(format!("Invalid VANE_HISTORY_MAX_DAYS value: {}", raw))
        })?;
        service = service.with_max_history_days(days);
    }

    let api_config = ApiConfig::from_env();
    let state = AppState::new(Arc::new(service), api_config);
    let app: Router = create_api_router(state)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Vane API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    // ConnectInfo feeds the per-IP rate limiter its fallback address.
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Select the record store backend.
///
/// Set `VANE_DB_DISABLE=true` to run on the in-memory store (no Postgres
/// required; records are lost on restart).
async fn build_record_store() -> ApiResult<Arc<dyn RecordStore>> {
    let disabled = std::env::var("VANE_DB_DISABLE")
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false);

    if disabled {
        tracing::warn!("Postgres disabled; records will not survive a restart");
        return Ok(Arc::new(MemoryRecordStore::new()));
    }

    let db_config = DbConfig::from_env();
    let store = PgRecordStore::from_config(&db_config)?;
    store.init_schema().await?;
    tracing::info!(pool_size = store.pool_size(), "Connected to Postgres");
    Ok(Arc::new(store))
}

/// Select the cache backend and wrap it in the read-through layer.
///
/// Set `VANE_CACHE_PATH` to persist cached payloads in LMDB; otherwise
/// the cache lives in process memory. `VANE_CACHE_TTL_SECS` overrides
/// the default entry TTL.
fn build_cache() -> ApiResult<ReadThroughCache> {
    let backend: Arc<dyn CacheStore> = match std::env::var("VANE_CACHE_PATH") {
        Ok(path) => {
            let size_mb = std::env::var("VANE_CACHE_SIZE_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_SIZE_MB);
            tracing::info!(path = %path, size_mb, "Using LMDB cache backend");
            Arc::new(LmdbCache::new(&path, size_mb).map_err(VaneError::from)?)
        }
        Err(_) => {
            tracing::info!("Using in-memory cache backend");
            Arc::new(InMemoryCache::new())
        }
    };

    let mut config = CacheConfig::default();
    if let Ok(raw) = std::env::var("VANE_CACHE_TTL_SECS") {
        let secs = raw.parse::<u64>().map_err(|_| {
            ApiError::invalid_payload(format!("Invalid VANE_CACHE_TTL_SECS value: {}", raw))
        })?;
        config = config.with_ttl(std::time::Duration::from_secs(secs));
    }

    Ok(ReadThroughCache::with_config(backend, config))
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("VANE_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("VANE_PORT").ok())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_payload(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_payload(format!("Invalid bind address {}: {}", addr, e)))
}
