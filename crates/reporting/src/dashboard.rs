//! Dashboard view — everything the overview and channel-analysis tabs display
//! for one loaded dataset.

use crate::charts::{self, BarChart, BoxPlot, ChannelField, Histogram, PieChart};
use chrono::{DateTime, Utc};
use cltv_analytics::LoadedDataset;
use cltv_core::{ChannelSummary, DatasetMeta};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardView {
    pub dataset_id: Uuid,
    pub status: String,
    pub meta: DatasetMeta,
    pub cost_histogram: Histogram,
    pub revenue_histogram: Histogram,
    pub channel_table: Vec<ChannelSummary>,
    pub cac_by_channel: BarChart,
    pub conversion_by_channel: BarChart,
    pub roi_by_channel: BarChart,
    pub cltv_by_channel: BarChart,
    pub revenue_share: PieChart,
    pub cltv_distribution: BoxPlot,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    pub fn build(dataset: &LoadedDataset, histogram_bins: usize) -> Self {
        let analysis = &dataset.analysis;
        let costs: Vec<f64> = analysis.customers.iter().map(|c| c.cost).collect();
        let revenues: Vec<f64> = analysis.customers.iter().map(|c| c.revenue).collect();
        let by = &analysis.by_channel;

        Self {
            dataset_id: dataset.id,
            status: dataset.status_line(),
            meta: analysis.meta.clone(),
            cost_histogram: charts::histogram(
                &costs,
                histogram_bins,
                "cost",
                "Distribution of Acquisition Cost",
            ),
            revenue_histogram: charts::histogram(
                &revenues,
                histogram_bins,
                "revenue",
                "Distribution of Revenue",
            ),
            channel_table: by.clone(),
            cac_by_channel: charts::bar(by, ChannelField::AvgCost),
            conversion_by_channel: charts::bar(by, ChannelField::AvgConvRate),
            roi_by_channel: charts::bar(by, ChannelField::AvgRoi),
            cltv_by_channel: charts::bar(by, ChannelField::AvgCltv),
            revenue_share: charts::revenue_pie(by),
            cltv_distribution: charts::cltv_box(&analysis.customers),
            generated_at: Utc::now(),
        }
    }
}
