use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::osm::types::{DiscoveryError, PointOfInterest, ResolutionError, ResolvedPlace, Settlement};
use crate::pipeline::{DiscoveryConfig, SettlementFailure, DEFAULT_CITY_RADIUS_KM, DEFAULT_POI_RADIUS_M};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ─── POST /api/discover ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct DiscoverRequest {
    pub city: String,
    #[serde(default = "default_city_radius")]
    pub city_radius_km: f64,
    #[serde(default = "default_poi_radius")]
    pub poi_radius_m: f64,
    #[serde(default)]
    pub max_settlements: Option<usize>,
    #[serde(default)]
    pub dedup: bool,
}

fn default_city_radius() -> f64 {
    DEFAULT_CITY_RADIUS_KM
}

fn default_poi_radius() -> f64 {
    DEFAULT_POI_RADIUS_M
}

#[derive(Serialize)]
pub struct DiscoverResponse {
    pub anchor: ResolvedPlace,
    pub settlements: Vec<Settlement>,
    pub restaurants: Vec<PointOfInterest>,
    pub failures: Vec<SettlementFailure>,
    pub total: usize,
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let city = request.city.trim();
    if city.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'city' field"));
    }
    if request.city_radius_km <= 0.0 || request.poi_radius_m <= 0.0 {
        return Err(api_error(StatusCode::BAD_REQUEST, "Radii must be positive"));
    }

    let config = DiscoveryConfig {
        anchor: city.to_string(),
        city_radius_km: request.city_radius_km,
        poi_radius_m: request.poi_radius_m,
        max_settlements: request.max_settlements,
        dedup: request.dedup,
    };

    let run = {
        let mut pipeline = state
            .pipeline
            .lock()
            .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Pipeline unavailable"))?;
        pipeline.run(&config)
    };

    match run {
        Ok(run) => {
            let total = run.restaurants.len();
            Ok(Json(DiscoverResponse {
                anchor: run.anchor,
                settlements: run.settlements,
                restaurants: run.restaurants,
                failures: run.failures,
                total,
            }))
        }
        Err(DiscoveryError::Resolution(ResolutionError::NoMatch(q))) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No coordinates found for '{}'", q),
        )),
        Err(e) => Err(api_error(StatusCode::BAD_GATEWAY, e.to_string())),
    }
}
