//! CSV exports of the enriched customer table and the channel summary.

use cltv_core::{ChannelSummary, CustomerMetrics, DashboardError, DashboardResult, DatasetAnalysis};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CUSTOMERS_FILE: &str = "customer_with_metrics.csv";
pub const CHANNELS_FILE: &str = "channel_summary.csv";

/// Paths written by [`write_exports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub customers: PathBuf,
    pub channels: PathBuf,
}

fn to_csv<T: Serialize>(rows: &[T]) -> DashboardResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Internal(e.into()))
}

/// `customer_id,channel,cost,conversion_rate,revenue,roi,cltv`
pub fn customers_csv(customers: &[CustomerMetrics]) -> DashboardResult<String> {
    to_csv(customers)
}

/// `channel,customers,avg_cost,avg_conv_rate,total_revenue,avg_roi,avg_cltv,revenue_share_%`
pub fn channels_csv(by_channel: &[ChannelSummary]) -> DashboardResult<String> {
    to_csv(by_channel)
}

/// Write both exports into `dir`, creating it if needed.
pub fn write_exports(dir: impl AsRef<Path>, analysis: &DatasetAnalysis) -> DashboardResult<ExportPaths> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        customers: dir.join(CUSTOMERS_FILE),
        channels: dir.join(CHANNELS_FILE),
    };
    std::fs::write(&paths.customers, customers_csv(&analysis.customers)?)?;
    std::fs::write(&paths.channels, channels_csv(&analysis.by_channel)?)?;

    metrics::counter!("exports.generated").increment(1);
    info!(
        customers = %paths.customers.display(),
        channels = %paths.channels.display(),
        "Exports written"
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cltv_analytics::{ingest, kpi};

    fn analysis() -> DatasetAnalysis {
        let csv = "customer_id,channel,cost,conversion_rate,revenue\n1,referral,10,0.1,110\n2,social media,20,0.2,60\n";
        kpi::compute(&ingest::load_bytes(csv.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_customers_csv_header_and_rows() {
        let text = customers_csv(&analysis().customers).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("customer_id,channel,cost,conversion_rate,revenue,roi,cltv")
        );
        assert_eq!(lines.next(), Some("1,referral,10.0,0.1,110.0,11.0,1.0"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_channels_csv_header() {
        let text = channels_csv(&analysis().by_channel).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("channel,customers,avg_cost,avg_conv_rate,total_revenue,avg_roi,avg_cltv,revenue_share_%")
        );
        assert!(text.lines().nth(1).unwrap().starts_with("referral,1,"));
    }

    #[test]
    fn test_write_exports_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = write_exports(&out, &analysis()).unwrap();
        assert_eq!(paths.customers, out.join(CUSTOMERS_FILE));
        let channels = std::fs::read_to_string(&paths.channels).unwrap();
        assert_eq!(channels.lines().count(), 3);
        assert!(paths.customers.exists());
    }
}
