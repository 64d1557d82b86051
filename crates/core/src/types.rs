use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Columns every acquisition dataset must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["customer_id", "channel", "cost", "conversion_rate", "revenue"];

/// One acquired customer as read from the input CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub channel: String,
    /// Acquisition cost paid for this customer.
    pub cost: f64,
    pub conversion_rate: f64,
    pub revenue: f64,
}

/// A customer record enriched with its derived ROI and CLTV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerMetrics {
    pub customer_id: String,
    pub channel: String,
    pub cost: f64,
    pub conversion_rate: f64,
    pub revenue: f64,
    /// `revenue / cost`
    pub roi: f64,
    /// `(revenue - cost) * conversion_rate / cost`
    pub cltv: f64,
}

/// Aggregated KPIs for one acquisition channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelSummary {
    pub channel: String,
    pub customers: u64,
    /// Mean acquisition cost (CAC).
    pub avg_cost: f64,
    pub avg_conv_rate: f64,
    pub total_revenue: f64,
    pub avg_roi: f64,
    pub avg_cltv: f64,
    /// Share of total revenue across all channels, in percent.
    #[serde(rename = "revenue_share_%")]
    pub revenue_share_pct: f64,
}

/// Overall dataset statistics shown on the overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DatasetMeta {
    pub rows: u64,
    pub channels: u64,
    pub current_weighted_roi: f64,
    pub current_avg_cltv: f64,
}

/// Output of the metrics engine for a single dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetAnalysis {
    pub customers: Vec<CustomerMetrics>,
    pub by_channel: Vec<ChannelSummary>,
    pub meta: DatasetMeta,
}
