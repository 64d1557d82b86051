use serde::Deserialize;

/// Root application configuration. Loaded from an optional `cltv-dashboard.toml`
/// in the working directory, then environment variables with the prefix
/// `CLTV_DASHBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Built-in dataset loaded by `POST /v1/datasets/builtin`.
    #[serde(default = "default_datafile")]
    pub default_datafile: String,
    #[serde(default)]
    pub preload_builtin: bool,
    /// Loaded datasets kept in memory before the oldest is evicted.
    #[serde(default = "default_max_datasets")]
    pub max_datasets: usize,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_node_id() -> String {
    "dashboard-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    7860
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_datafile() -> String {
    "customer_acquisition_data.csv".to_string()
}
fn default_max_datasets() -> usize {
    64
}
fn default_export_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}
fn default_histogram_bins() -> usize {
    20
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_datafile: default_datafile(),
            preload_builtin: false,
            max_datasets: default_max_datasets(),
            export_dir: default_export_dir(),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            data: DataConfig::default(),
            charts: ChartsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `cltv-dashboard.toml` (optional) and environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("cltv-dashboard").required(false))
            .add_source(
                config::Environment::with_prefix("CLTV_DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values that would make the dashboard unusable.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.charts.histogram_bins == 0 {
            return Err(config::ConfigError::Message(
                "charts.histogram_bins must be at least 1".to_string(),
            ));
        }
        if self.data.max_datasets == 0 {
            return Err(config::ConfigError::Message(
                "data.max_datasets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 7860);
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(config.data.default_datafile, "customer_acquisition_data.csv");
        assert!(!config.data.preload_builtin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[api]\nhttp_port = 8000\n[data]\npreload_builtin = true\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.api.http_port, 8000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.data.preload_builtin);
        assert_eq!(config.data.max_datasets, 64);
    }

    #[test]
    fn test_zero_bins_rejected() {
        let mut config = AppConfig::default();
        config.charts.histogram_bins = 0;
        assert!(config.validate().is_err());
    }
}
