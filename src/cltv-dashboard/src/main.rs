//! CLTV & ROI Dashboard — customer lifetime value and ROI analytics.
//!
//! Runs the HTTP API by default; `analyze`, `simulate` and `export` work on a
//! CSV directly from the command line.

use cltv_analytics::{parse_allocation, simulate, DatasetStore, DEFAULT_ALLOCATION};
use cltv_api::{ApiServer, AppState};
use cltv_core::config::AppConfig;
use cltv_reporting::{write_exports, DashboardView};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "cltv-dashboard")]
#[command(about = "Customer lifetime value (CLTV) and ROI dashboard")]
#[command(version)]
struct Cli {
    /// Built-in dataset path (overrides config)
    #[arg(long, global = true, env = "DEFAULT_DATAFILE")]
    datafile: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API (default)
    Serve {
        /// Bind address (overrides config)
        #[arg(long, env = "CLTV_DASHBOARD__API__HOST")]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "CLTV_DASHBOARD__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Prometheus metrics port (overrides config)
        #[arg(long, env = "CLTV_DASHBOARD__METRICS__PORT")]
        metrics_port: Option<u16>,

        /// Load the built-in dataset at startup
        #[arg(long, default_value_t = false)]
        preload: bool,
    },
    /// Print the dashboard view of a CSV as JSON
    Analyze {
        /// CSV to analyze (defaults to the built-in dataset)
        file: Option<PathBuf>,
    },
    /// Simulate a budget reallocation
    Simulate {
        file: Option<PathBuf>,

        /// JSON object of channel weights
        #[arg(long, default_value = DEFAULT_ALLOCATION)]
        allocation: String,
    },
    /// Write customer and channel CSVs with computed metrics
    Export {
        file: Option<PathBuf>,

        /// Output directory (defaults to data.export_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cltv_dashboard=info,cltv_api=info,cltv_analytics=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();
}

fn dataset_path(config: &AppConfig, file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(&config.data.default_datafile))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(datafile) = cli.datafile {
        config.data.default_datafile = datafile;
    }

    let command = cli.command.unwrap_or(Command::Serve {
        host: None,
        http_port: None,
        metrics_port: None,
        preload: false,
    });

    match command {
        Command::Serve {
            host,
            http_port,
            metrics_port,
            preload,
        } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            if let Some(port) = metrics_port {
                config.metrics.port = port;
            }
            config.data.preload_builtin |= preload;
            serve(config).await
        }
        Command::Analyze { file } => {
            let store = DatasetStore::new(1);
            let ds = store.load_builtin(dataset_path(&config, file))?;
            let view = DashboardView::build(&ds, config.charts.histogram_bins);
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        Command::Simulate { file, allocation } => {
            let store = DatasetStore::new(1);
            let ds = store.load_builtin(dataset_path(&config, file))?;
            let allocation = parse_allocation(&allocation)?;
            let outcome = simulate(&ds.analysis.by_channel, &allocation)?;
            println!("{}\n", outcome.summary_markdown());
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Export { file, out } => {
            let store = DatasetStore::new(1);
            let ds = store.load_builtin(dataset_path(&config, file))?;
            let out = out.unwrap_or_else(|| PathBuf::from(&config.data.export_dir));
            let paths = write_exports(&out, &ds.analysis)?;
            println!("{}", paths.customers.display());
            println!("{}", paths.channels.display());
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!(
        node_id = %config.node_id,
        host = %config.api.host,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        datafile = %config.data.default_datafile,
        "Configuration loaded"
    );

    let preload = config.data.preload_builtin;
    let metrics_enabled = config.metrics.enabled;
    let state = AppState::new(config);

    if preload {
        match state.store.load_builtin(&state.config.data.default_datafile) {
            Ok(ds) => info!(dataset_id = %ds.id, status = %ds.status_line(), "Built-in dataset preloaded"),
            Err(e) => warn!(error = %e, "Built-in dataset not preloaded"),
        }
    }

    let api_server = ApiServer::new(state);

    if metrics_enabled {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("CLTV dashboard is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
