//! Reallocation simulator REST endpoint.

use crate::extract::{DatasetId, JsonOrDefault};
use crate::rest::{ApiError, AppState, ErrorResponse};
use axum::extract::State;
use axum::Json;
use cltv_analytics::{parse_allocation, simulate, Allocation, SimulationOutcome, DEFAULT_ALLOCATION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SimulateRequest {
    /// Either a JSON object `{channel: weight}` or the same object as a string.
    /// Omitted means the default allocation.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub allocation: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulateResponse {
    /// Markdown summary of the ROI and CLTV change.
    pub summary: String,
    pub details: SimulationOutcome,
    /// Allocation after normalisation to fractions of 1.0.
    pub weights: BTreeMap<String, f64>,
}

fn allocation_from(request: &SimulateRequest) -> Result<Allocation, ApiError> {
    let text = match &request.allocation {
        None | Some(serde_json::Value::Null) => DEFAULT_ALLOCATION.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    Ok(parse_allocation(&text)?)
}

/// POST /v1/datasets/{id}/simulate — Simulate a budget reallocation.
#[utoipa::path(
    post,
    path = "/v1/datasets/{id}/simulate",
    tag = "Simulator",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    request_body = SimulateRequest,
    responses(
        (status = 200, description = "Simulation result", body = SimulateResponse),
        (status = 400, description = "Invalid allocation", body = ErrorResponse),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_simulate(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
    JsonOrDefault(request): JsonOrDefault<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let ds = state.store.get(&id)?;
    let allocation = allocation_from(&request)?;
    let details = simulate(&ds.analysis.by_channel, &allocation)?;

    Ok(Json(SimulateResponse {
        summary: details.summary_markdown(),
        weights: allocation.normalized(),
        details,
    }))
}
