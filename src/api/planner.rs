use axum::{body::Bytes, extract::State, response::Json};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ApiError, AppState};
use crate::models::{GeneratedPlan, TripRequest};

/// `POST /api/trip-planner`
#[instrument(skip_all)]
pub async fn plan_trip(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GeneratedPlan>, ApiError> {
    // Parsed by hand so that any content type is accepted and bad JSON gets our error shape
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejected malformed body: {}", e);
        ApiError::bad_request("Malformed request body").with_details(e.to_string())
    })?;

    let request = TripRequest::from_json(&payload);
    state
        .planner
        .plan(&request)
        .await
        .map(Json)
        .map_err(|err| ApiError::from_plan_error(err, state.planner.provider_name()))
}
