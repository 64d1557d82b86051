//! CSV download endpoints.

use crate::extract::DatasetId;
use crate::rest::{ApiError, AppState, ErrorResponse};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use cltv_reporting::export::{self, CHANNELS_FILE, CUSTOMERS_FILE};
use uuid::Uuid;

fn csv_attachment(filename: &'static str, body: String) -> impl IntoResponse {
    metrics::counter!("exports.generated", "file" => filename).increment(1);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

/// GET /v1/datasets/{id}/export/customers.csv — Customer-level CSV with ROI and CLTV.
#[utoipa::path(
    get,
    path = "/v1/datasets/{id}/export/customers.csv",
    tag = "Export",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    responses(
        (status = 200, description = "Customer CSV", content_type = "text/csv", body = String),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_customers_csv(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
) -> Result<impl IntoResponse, ApiError> {
    let ds = state.store.get(&id)?;
    let body = export::customers_csv(&ds.analysis.customers)?;
    Ok(csv_attachment(CUSTOMERS_FILE, body))
}

/// GET /v1/datasets/{id}/export/channels.csv — Channel summary CSV.
#[utoipa::path(
    get,
    path = "/v1/datasets/{id}/export/channels.csv",
    tag = "Export",
    params(("id" = Uuid, Path, description = "Dataset identifier")),
    responses(
        (status = 200, description = "Channel summary CSV", content_type = "text/csv", body = String),
        (status = 404, description = "Dataset not loaded", body = ErrorResponse),
    )
)]
pub async fn handle_channels_csv(
    State(state): State<AppState>,
    DatasetId(id): DatasetId,
) -> Result<impl IntoResponse, ApiError> {
    let ds = state.store.get(&id)?;
    let body = export::channels_csv(&ds.analysis.by_channel)?;
    Ok(csv_attachment(CHANNELS_FILE, body))
}
