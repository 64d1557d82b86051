//! Shared REST state, error mapping and operational endpoints.

use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cltv_analytics::DatasetStore;
use cltv_core::{AppConfig, DashboardError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    pub config: Arc<AppConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: Arc::new(DatasetStore::new(config.data.max_datasets)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Error returned by every handler and custom extractor.
#[derive(Debug)]
pub enum ApiError {
    Dashboard(DashboardError),
    /// The request was refused before reaching a handler (bad path, body or size).
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        Self::Dashboard(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), "malformed_request", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), "invalid_dataset_id", rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::rejected(rejection.status(), "malformed_request", rejection.body_text())
    }
}

impl ApiError {
    /// Size-limit failures keep their 413 regardless of which extractor hit them.
    fn rejected(status: StatusCode, code: &'static str, message: String) -> Self {
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "payload_too_large"
        } else {
            code
        };
        Self::Rejected {
            status,
            code,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::Dashboard(DashboardError::UnknownDataset(_))
            | Self::Dashboard(DashboardError::DatasetNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Dashboard(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Dashboard(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Dashboard(e) => e.code(),
            Self::Rejected { code, .. } => code,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Dashboard(e) => e.to_string(),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let detail = self.message();
        if status.is_server_error() {
            error!(error = %detail, "Request failed");
            metrics::counter!("api.errors").increment(1);
        } else {
            warn!(error = %detail, status = status.as_u16(), "Request rejected");
            metrics::counter!("api.client_errors", "code" => code).increment(1);
        }

        let message = if status.is_server_error() {
            "Internal processing error".to_string()
        } else {
            detail
        };
        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub datasets_loaded: u64,
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.config.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        datasets_loaded: state.store.len() as u64,
    })
}

/// GET /ready — Readiness probe.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_rejection_keeps_413_code() {
        let err = ApiError::rejected(StatusCode::PAYLOAD_TOO_LARGE, "malformed_request", "too big".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.code(), "payload_too_large");

        let err = ApiError::rejected(StatusCode::BAD_REQUEST, "invalid_dataset_id", "bad".into());
        assert_eq!(err.code(), "invalid_dataset_id");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(DashboardError::UnknownDataset("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DashboardError::DatasetNotFound("x.csv".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::from(DashboardError::NoData).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(DashboardError::NoData).code(), "no_data");
        assert_eq!(
            ApiError::from(DashboardError::Io(std::io::Error::other("disk"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
