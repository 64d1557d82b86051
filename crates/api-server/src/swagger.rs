//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CLTV & ROI Dashboard API",
        version = "0.1.0",
        description = "Customer lifetime value and return-on-investment analytics.\n\nLoad an acquisition CSV, inspect per-channel KPIs, simulate budget reallocation and download enriched CSVs.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Operations", description = "Health, readiness, and liveness probes"),
        (name = "Datasets", description = "Load datasets and view the dashboard"),
        (name = "Simulator", description = "Budget reallocation what-if analysis"),
        (name = "Export", description = "CSV downloads"),
    ),
    paths(
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
        // Datasets
        crate::dataset_rest::handle_upload,
        crate::dataset_rest::handle_load_builtin,
        crate::dataset_rest::handle_list,
        crate::dataset_rest::handle_dashboard,
        crate::dataset_rest::handle_channels,
        crate::dataset_rest::handle_delete,
        // Simulator
        crate::simulator_rest::handle_simulate,
        // Export
        crate::export_rest::handle_customers_csv,
        crate::export_rest::handle_channels_csv,
    ),
    components(schemas(
        cltv_core::types::CustomerMetrics,
        cltv_core::types::ChannelSummary,
        cltv_core::types::DatasetMeta,
        cltv_analytics::DatasetSource,
        cltv_analytics::SimulationOutcome,
        cltv_reporting::DashboardView,
        cltv_reporting::charts::Histogram,
        cltv_reporting::charts::HistogramBin,
        cltv_reporting::charts::BarChart,
        cltv_reporting::charts::BarPoint,
        cltv_reporting::charts::PieChart,
        cltv_reporting::charts::PieSlice,
        cltv_reporting::charts::BoxPlot,
        cltv_reporting::charts::BoxStats,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
        crate::dataset_rest::DatasetLoaded,
        crate::simulator_rest::SimulateRequest,
        crate::simulator_rest::SimulateResponse,
    ))
)]
pub struct ApiDoc;
