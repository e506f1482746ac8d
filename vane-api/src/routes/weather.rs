//! Weather REST API Routes
//!
//! Current conditions and the multi-day history window for a tracked
//! location. Snapshots are opaque provider payloads; the API never
//! inspects them beyond caching.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use vane_core::{DaySummary, WeatherSnapshot};
use vane_service::LocationWeatherService;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Query parameters for GET /weather/history/{id}.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HistoryParams {
    /// Window size in days, counting back from today inclusive.
    /// `summaryDays` is accepted as a legacy spelling.
    #[serde(alias = "summaryDays")]
    pub days: Option<i64>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /weather/{id} - Current weather for a location
#[utoipa::path(
    get,
    path = "/weather/{id}",
    tag = "Weather",
    params(
        ("id" = String, Path, description = "Location ID (UUID)")
    ),
    responses(
        (status = 200, description = "Current conditions as reported by the provider", body = WeatherSnapshot),
        (status = 400, description = "Malformed location ID", body = ApiError),
        (status = 404, description = "Location not found", body = ApiError),
        (status = 503, description = "Weather provider unavailable", body = ApiError),
    ),
)]
pub async fn get_current_weather(
    State(service): State<Arc<LocationWeatherService>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let snapshot = service.get_current_weather(&id).await?;
    Ok(Json(snapshot))
}

/// GET /weather/history/{id}?days=N - Daily summaries for the past N days
#[utoipa::path(
    get,
    path = "/weather/history/{id}",
    tag = "Weather",
    params(
        ("id" = String, Path, description = "Location ID (UUID)"),
        ("days" = i64, Query, description = "Window size in days (positive); summaryDays is accepted as an alias"),
    ),
    responses(
        (status = 200, description = "Day summaries ordered most recent first", body = Vec<DaySummary>),
        (status = 400, description = "Malformed ID or invalid day count", body = ApiError),
        (status = 404, description = "Location not found", body = ApiError),
        (status = 503, description = "Weather provider unavailable", body = ApiError),
    ),
)]
pub async fn get_weather_history(
    State(service): State<Arc<LocationWeatherService>>,
    Path(id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<impl IntoResponse> {
    let Some(days) = params.days else {
        return Err(ApiError::missing_field("days"));
    };

    let summaries = service.get_weather_history(&id, days).await?;
    Ok(Json(summaries))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the weather routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/:id", axum::routing::get(get_current_weather))
        .route("/history/:id", axum::routing::get(get_weather_history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt; // for `oneshot`
    use vane_storage::ReadThroughCache;
    use vane_test_utils::{InMemoryCache, MemoryRecordStore, MockWeatherProvider, sample_location};

    struct Harness {
        app: axum::Router,
        provider: Arc<MockWeatherProvider>,
        location_id: String,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryRecordStore::new());
        let location = sample_location("Paris", 48.8566, 2.3522);
        let location_id = location.id.to_string();
        store.insert(location).await;

        let cache = ReadThroughCache::new(Arc::new(InMemoryCache::new()));
        let provider = Arc::new(MockWeatherProvider::new());
        let service = Arc::new(LocationWeatherService::new(
            store,
            provider.clone(),
            cache,
        ));
        let app = create_router().with_state(AppState::new(service, ApiConfig::default()));

        Harness {
            app,
            provider,
            location_id,
        }
    }

    async fn get_json(
        app: &axum::Router,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    #[tokio::test]
    async fn test_current_weather_returns_provider_payload() {
        let h = harness().await;
        let (status, body) = get_json(&h.app, &format!("/{}", h.location_id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "mock");
        assert_eq!(body["lat"], 48.8566);
        assert_eq!(body["current"]["temp"], 20.0);
    }

    #[tokio::test]
    async fn test_current_weather_is_cached() {
        let h = harness().await;
        let _ = get_json(&h.app, &format!("/{}", h.location_id)).await;
        let _ = get_json(&h.app, &format!("/{}", h.location_id)).await;

        assert_eq!(h.provider.current_calls(), 1);
    }

    #[tokio::test]
    async fn test_current_weather_malformed_id_is_400() {
        let h = harness().await;
        let (status, body) = get_json(&h.app, "/not-a-uuid").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_current_weather_unknown_location_is_404() {
        let h = harness().await;
        let (status, body) = get_json(&h.app, &format!("/{}", vane_core::new_location_id())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_current_weather_provider_outage_is_503() {
        let h = harness().await;
        h.provider.fail_current("socket hang up");

        let (status, body) = get_json(&h.app, &format!("/{}", h.location_id)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_history_returns_window_most_recent_first() {
        let h = harness().await;
        let (status, body) =
            get_json(&h.app, &format!("/history/{}?days=3", h.location_id)).await;

        assert_eq!(status, StatusCode::OK);
        let summaries = body.as_array().unwrap();
        assert_eq!(summaries.len(), 3);

        let dates: Vec<&str> = summaries
            .iter()
            .map(|s| s["date"].as_str().unwrap())
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted, "summaries must run most recent first");
    }

    #[tokio::test]
    async fn test_history_accepts_summary_days_alias() {
        let h = harness().await;
        let (status, body) =
            get_json(&h.app, &format!("/history/{}?summaryDays=2", h.location_id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_history_missing_days_is_400() {
        let h = harness().await;
        let (status, body) = get_json(&h.app, &format!("/history/{}", h.location_id)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELD");
        assert!(body["message"].as_str().unwrap().contains("days"));
    }

    #[tokio::test]
    async fn test_history_zero_days_is_400() {
        let h = harness().await;
        let (status, body) =
            get_json(&h.app, &format!("/history/{}?days=0", h.location_id)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_history_negative_days_is_400() {
        let h = harness().await;
        let (status, _) =
            get_json(&h.app, &format!("/history/{}?days=-2", h.location_id)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_validates_before_provider_io() {
        let h = harness().await;
        let _ = get_json(&h.app, &format!("/history/{}?days=0", h.location_id)).await;
        let _ = get_json(&h.app, "/history/not-a-uuid?days=3").await;

        assert_eq!(h.provider.day_calls(), 0);
    }

    #[tokio::test]
    async fn test_history_unknown_location_is_404_without_fanout() {
        let h = harness().await;
        let (status, _) = get_json(
            &h.app,
            &format!("/history/{}?days=3", vane_core::new_location_id()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(h.provider.day_calls(), 0);
    }

    #[tokio::test]
    async fn test_history_day_failure_is_503() {
        let h = harness().await;
        let today = chrono::Utc::now().date_naive();
        h.provider.fail_day(today, "upstream 500");

        let (status, body) =
            get_json(&h.app, &format!("/history/{}?days=2", h.location_id)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
    }
}
