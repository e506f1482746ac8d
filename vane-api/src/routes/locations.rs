//! Location REST API Routes
//!
//! CRUD over tracked locations. Creation geocodes the submitted city
//! name and stores the canonical result; updates replace the stored
//! fields wholesale. All handlers go through the service so cache
//! invalidation stays in one place.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vane_core::{Location, LocationFields};
use vane_service::LocationWeatherService;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Body for POST /locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateLocationRequest {
    /// City name to geocode, e.g. "Portland"
    pub city: String,
}

/// Body for PUT /locations/{id}. Replaces the stored fields wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateLocationRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /locations - List all tracked locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "Locations",
    responses(
        (status = 200, description = "All tracked locations in creation order", body = Vec<Location>),
    ),
)]
pub async fn list_locations(
    State(service): State<Arc<LocationWeatherService>>,
) -> ApiResult<impl IntoResponse> {
    let locations = service.list_locations().await?;
    Ok(Json(locations))
}

/// POST /locations - Track a new location by city name
#[utoipa::path(
    post,
    path = "/locations",
    tag = "Locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created from the geocoded city", body = Location),
        (status = 400, description = "City field missing or blank", body = ApiError),
        (status = 404, description = "No geocoding match for the city", body = ApiError),
        (status = 503, description = "Geocoding provider unavailable", body = ApiError),
    ),
)]
pub async fn create_location(
    State(service): State<Arc<LocationWeatherService>>,
    Json(req): Json<CreateLocationRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate required fields
    if req.city.trim().is_empty() {
        return Err(ApiError::missing_field("city"));
    }

    let location = service.add_location(&req.city).await?;

    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /locations/{id} - Get location by ID
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "Locations",
    params(
        ("id" = String, Path, description = "Location ID (UUID)")
    ),
    responses(
        (status = 200, description = "Location details", body = Location),
        (status = 400, description = "Malformed location ID", body = ApiError),
        (status = 404, description = "Location not found", body = ApiError),
    ),
)]
pub async fn get_location(
    State(service): State<Arc<LocationWeatherService>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let location = service.get_location(&id).await?;
    Ok(Json(location))
}

/// PUT /locations/{id} - Replace a location's fields
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "Locations",
    params(
        ("id" = String, Path, description = "Location ID (UUID)")
    ),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Updated location", body = Location),
        (status = 400, description = "Malformed ID or invalid fields", body = ApiError),
        (status = 404, description = "Location not found", body = ApiError),
    ),
)]
pub async fn update_location(
    State(service): State<Arc<LocationWeatherService>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateLocationRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let fields = LocationFields {
        name: req.name,
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let location = service.update_location(&id, fields).await?;

    Ok(Json(location))
}

/// DELETE /locations/{id} - Stop tracking a location
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "Locations",
    params(
        ("id" = String, Path, description = "Location ID (UUID)")
    ),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 400, description = "Malformed location ID", body = ApiError),
        (status = 404, description = "Location not found", body = ApiError),
    ),
)]
pub async fn delete_location(
    State(service): State<Arc<LocationWeatherService>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    service.delete_location(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the location routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::get(list_locations))
        .route("/", axum::routing::post(create_location))
        .route("/:id", axum::routing::get(get_location))
        .route("/:id", axum::routing::put(update_location))
        .route("/:id", axum::routing::delete(delete_location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for `oneshot`
    use vane_storage::ReadThroughCache;
    use vane_test_utils::{InMemoryCache, MemoryRecordStore, MockWeatherProvider};

    fn test_state() -> AppState {
        let store = Arc::new(MemoryRecordStore::new());
        let cache = ReadThroughCache::new(Arc::new(InMemoryCache::new()));
        let provider = Arc::new(MockWeatherProvider::new().with_city("Paris", 48.8566, 2.3522));
        let service = Arc::new(LocationWeatherService::new(store, provider, cache));
        AppState::new(service, ApiConfig::default())
    }

    fn test_app() -> axum::Router {
        create_router().with_state(test_state())
    }

    async fn json_request(
        router: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (axum::http::StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
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
    async fn test_list_starts_empty() {
        let app = test_app();
        let (status, body) = json_request(&app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_location_geocodes_city() {
        let app = test_app();
        let (status, body) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Paris");
        assert_eq!(body["latitude"], 48.8566);
        assert_eq!(body["longitude"], 2.3522);
        assert!(body["id"].as_str().is_some());

        let (status, listed) = json_request(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_blank_city_is_rejected() {
        let app = test_app();
        let (status, body) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "   "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELD");
    }

    #[tokio::test]
    async fn test_create_unknown_city_is_404() {
        let app = test_app();
        let (status, body) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Qwxyzplace"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "CITY_NOT_FOUND");
        assert!(body["message"].as_str().unwrap().contains("Qwxyzplace"));
    }

    #[tokio::test]
    async fn test_create_during_geocoder_outage_is_503() {
        let store = Arc::new(MemoryRecordStore::new());
        let cache = ReadThroughCache::new(Arc::new(InMemoryCache::new()));
        let provider = Arc::new(MockWeatherProvider::new());
        provider.fail_geocode("connection refused");
        let service = Arc::new(LocationWeatherService::new(store, provider, cache));
        let app = create_router().with_state(AppState::new(service, ApiConfig::default()));

        let (status, body) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_get_location_roundtrip() {
        let app = test_app();
        let (_, created) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = json_request(&app, "GET", &format!("/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_400() {
        let app = test_app();
        let (status, body) = json_request(&app, "GET", "/not-a-uuid", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404() {
        let app = test_app();
        let id = vane_core::new_location_id();
        let (status, body) = json_request(&app, "GET", &format!("/{}", id), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let app = test_app();
        let (_, created) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = json_request(
            &app,
            "PUT",
            &format!("/{}", id),
            Some(serde_json::json!({
                "name": "Paris Centre",
                "latitude": 48.86,
                "longitude": 2.35
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["name"], "Paris Centre");
        assert_eq!(updated["latitude"], 48.86);

        let (_, fetched) = json_request(&app, "GET", &format!("/{}", id), None).await;
        assert_eq!(fetched["name"], "Paris Centre");
    }

    #[tokio::test]
    async fn test_update_blank_name_is_rejected() {
        let app = test_app();
        let (_, created) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = json_request(
            &app,
            "PUT",
            &format!("/{}", id),
            Some(serde_json::json!({"name": "", "latitude": 0.0, "longitude": 0.0})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_FIELD");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let app = test_app();
        let id = vane_core::new_location_id();

        let (status, body) = json_request(
            &app,
            "PUT",
            &format!("/{}", id),
            Some(serde_json::json!({"name": "Ghost", "latitude": 0.0, "longitude": 0.0})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_404() {
        let app = test_app();
        let (_, created) = json_request(
            &app,
            "POST",
            "/",
            Some(serde_json::json!({"city": "Paris"})),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = json_request(&app, "DELETE", &format!("/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);

        let (status, _) = json_request(&app, "GET", &format!("/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_404() {
        let app = test_app();
        let id = vane_core::new_location_id();
        let (status, _) = json_request(&app, "DELETE", &format!("/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
