//! Dataset loading and dashboard REST endpoints.

use crate::extract::{CsvBody, DatasetId};
use crate::rest::{ApiError, AppState, ErrorResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cltv_core::{ChannelSummary, DashboardError, DashboardResult, DatasetMeta};
use cltv_analytics::{DatasetSource, LoadedDataset};
use cltv_reporting::DashboardView;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetLoaded {
    pub dataset_id: Uuid,
    pub source: DatasetSource,
    pub status: String,
    pub meta: DatasetMeta,
}

impl From<&LoadedDataset> for DatasetLoaded {
    fn from(ds: &LoadedDataset) -> Self {
        Self {
            dataset_id: ds.id,
            source: ds.source.clone(),
            status: ds.status_line(),
            meta: ds.analysis.meta.clone(),
        }
    }
}

/// Run CSV parsing and metric computation off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> DashboardResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::from(DashboardError::Internal(e.into())))?
        .map_err(ApiError::from)
}

/// POST /v1/datasets — Load an uploaded CSV body.
#[utoipa::path(
    post,
    path = "/v1/datasets",
    tag = "Datasets",
    request_body(content = String, content_type = "text/csv",
        description = "CSV with columns customer_id, channel, cost, conversion_rate, revenue"),
    responses(
        (status = 201, description = "Dataset loaded", body = DatasetLoaded),
        (status = 400, description = "CSV rejected", body = ErrorResponse),
        (status = 413, description = "Upload too large"),
    )
)]
pub async fn handle_upload(
    State(state): State<AppState>,
    CsvBody(body): CsvBody,
) -> Result<(StatusCode, Json<DatasetLoaded>), ApiError> {
    let store = state.store.clone();
    let ds = blocking(move || store.load_upload(&body)).await?;
    info!(dataset_id = %ds.id, rows = ds.analysis.meta.rows, "Uploaded CSV loaded");
    Ok((StatusCode::CREATED, Json(DatasetLoaded::from(&*ds))))
}

/// POST /v1/datasets/builtin — Load the configured default dataset.
#[utoipa::path(
    post,
    path = "/v1/datasets/builtin",
    tag = "Datasets",
    responses(
        (status = 201, description = "Dataset loaded", body = DatasetLoaded),
        (status = 404, description = "Default dataset file missing", body = ErrorResponse),
    )
)]
pub async fn handle_load_builtin(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DatasetLoaded>), ApiError> {
    let store = state.store.clone();
    let path = state.config.data.default_datafile.clone();
    let ds = blocking(move || store.load_builtin(path)).await?;
    Ok((StatusCode::CREATED, Json(DatasetLoaded::from(&*ds))))
}

/// GET /v1/datasets — List loaded datasets, oldest first.
#[utoipa::path(
    get,
    path = "/v1/datasets",
    tag = "Datasets",
    responses((status = 200, description = "Loaded datasets", body = Vec<DatasetLoaded>))
)]
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<DatasetLoaded>> {
    Json(
        state
            .store
            .list()
            .iter()
            .map(|ds| DatasetLoaded::from(&**ds))
            .collect(),
    )
}

fn lookup(state: &AppState, id: &Uuid) -> Result<Arc<LoadedDataset>, ApiError> {
    state.store.get(id).map_err(ApiError::from)
}

/// GET /v1/datasets/{id} — Overview and channel-analysis dashboard.
#[utoipa::path(
    get,
    path = "/v1/datasets/{id}",
    tag = "Datasets",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    responses(
        (status = 200, description = "Dashboard view", body = DashboardView),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_dashboard(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
) -> Result<Json<DashboardView>, ApiError> {
    let ds = lookup(&state, &id)?;
    Ok(Json(DashboardView::build(&ds, state.config.charts.histogram_bins)))
}

/// GET /v1/datasets/{id}/channels — Channel summary table.
#[utoipa::path(
    get,
    path = "/v1/datasets/{id}/channels",
    tag = "Datasets",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    responses(
        (status = 200, description = "Channel summary sorted by average CLTV", body = Vec<ChannelSummary>),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_channels(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
) -> Result<Json<Vec<ChannelSummary>>, ApiError> {
    let ds = lookup(&state, &id)?;
    Ok(Json(ds.analysis.by_channel.clone()))
}

/// DELETE /v1/datasets/{id} — Drop a loaded dataset.
#[utoipa::path(
    delete,
    path = "/v1/datasets/{id}",
    tag = "Datasets",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    responses(
        (status = 204, description = "Dataset removed"),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_delete(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
) -> Result<StatusCode, ApiError> {
    if state.store.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DashboardError::UnknownDataset(id.to_string()).into())
    }
}
