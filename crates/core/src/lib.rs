//! Shared configuration, error and data types for the CLTV & ROI dashboard.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{DashboardError, DashboardResult};
pub use types::{ChannelSummary, CustomerMetrics, CustomerRecord, DatasetAnalysis, DatasetMeta};
