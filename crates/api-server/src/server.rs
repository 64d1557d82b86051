//! API server — builds the router and runs the HTTP and metrics listeners.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use crate::{dataset_rest, export_rest, simulator_rest};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use cltv_core::config::AppConfig;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the full REST router over `state`.
pub fn router(state: AppState) -> Router {
    let max_upload = state.config.api.max_upload_bytes;

    Router::new()
        // Datasets
        .route(
            "/v1/datasets",
            post(dataset_rest::handle_upload).get(dataset_rest::handle_list),
        )
        .route("/v1/datasets/builtin", post(dataset_rest::handle_load_builtin))
        .route(
            "/v1/datasets/:id",
            get(dataset_rest::handle_dashboard).delete(dataset_rest::handle_delete),
        )
        .route("/v1/datasets/:id/channels", get(dataset_rest::handle_channels))
        // Simulator
        .route("/v1/datasets/:id/simulate", post(simulator_rest::handle_simulate))
        // Export
        .route(
            "/v1/datasets/:id/export/customers.csv",
            get(export_rest::handle_customers_csv),
        )
        .route(
            "/v1/datasets/:id/export/channels.csv",
            get(export_rest::handle_channels_csv),
        )
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn config(&self) -> &AppConfig {
        &self.state.config
    }

    /// Start the HTTP REST server. Blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone());

        let addr = SocketAddr::new(self.config().api.host.parse()?, self.config().api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus metrics exporter on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config().api.host.parse()?,
                self.config().metrics.port,
            ))
            .install()?;

        info!(port = self.config().metrics.port, "Metrics exporter started");
        Ok(())
    }
}
