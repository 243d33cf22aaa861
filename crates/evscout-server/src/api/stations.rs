use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use evscout_tomtom::{BoundingBox, StationRecord};

use super::{map_provider_error, ApiError, AppState};

/// All four coordinates are required, in floating-point degrees. Nothing is
/// enforced beyond that; oversized or inverted boxes are the client's problem
/// and only draw a warning log downstream.
#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResults {
    pub results: Vec<StationRecord>,
}

/// `GET /api/ev-stations` — batch grid search over a bounding box.
pub(super) async fn search_stations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let bbox = BoundingBox {
        min_lat: params.min_lat,
        min_lon: params.min_lon,
        max_lat: params.max_lat,
        max_lon: params.max_lon,
    };

    let results = state
        .tomtom
        .find_stations(&bbox)
        .await
        .map_err(|e| map_provider_error(&e))?;

    Ok(Json(SearchResults { results }))
}

/// `GET /api/ev-stations/availability/{availability_id}` — provider
/// passthrough for real-time charging availability.
pub(super) async fn station_availability(
    State(state): State<AppState>,
    Path(availability_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = state
        .tomtom
        .charging_availability(&availability_id)
        .await
        .map_err(|e| map_provider_error(&e))?;

    Ok(Json(payload))
}
