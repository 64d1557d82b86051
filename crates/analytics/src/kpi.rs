//! Per-customer ROI/CLTV and per-channel KPI aggregation.

use cltv_core::{
    ChannelSummary, CustomerMetrics, CustomerRecord, DashboardError, DashboardResult,
    DatasetAnalysis, DatasetMeta,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Return on investment for one customer: `revenue / cost`.
pub fn roi(record: &CustomerRecord) -> f64 {
    record.revenue / record.cost
}

/// Customer lifetime value: `(revenue - cost) * conversion_rate / cost`.
pub fn cltv(record: &CustomerRecord) -> f64 {
    (record.revenue - record.cost) * record.conversion_rate / record.cost
}

#[derive(Default)]
struct ChannelAccumulator {
    customers: u64,
    cost: f64,
    conv_rate: f64,
    revenue: f64,
    roi: f64,
    cltv: f64,
}

impl ChannelAccumulator {
    fn add(&mut self, m: &CustomerMetrics) {
        self.customers += 1;
        self.cost += m.cost;
        self.conv_rate += m.conversion_rate;
        self.revenue += m.revenue;
        self.roi += m.roi;
        self.cltv += m.cltv;
    }

    fn finish(self, channel: String) -> ChannelSummary {
        let n = self.customers as f64;
        ChannelSummary {
            channel,
            customers: self.customers,
            avg_cost: self.cost / n,
            avg_conv_rate: self.conv_rate / n,
            total_revenue: self.revenue,
            avg_roi: self.roi / n,
            avg_cltv: self.cltv / n,
            revenue_share_pct: 0.0,
        }
    }
}

/// Enrich every record and build the channel summary and overall stats.
pub fn compute(records: &[CustomerRecord]) -> DashboardResult<DatasetAnalysis> {
    if records.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }

    let customers: Vec<CustomerMetrics> = records
        .iter()
        .map(|r| CustomerMetrics {
            customer_id: r.customer_id.clone(),
            channel: r.channel.clone(),
            cost: r.cost,
            conversion_rate: r.conversion_rate,
            revenue: r.revenue,
            roi: roi(r),
            cltv: cltv(r),
        })
        .collect();

    let by_channel = summarize_channels(&customers);

    let n = customers.len() as f64;
    let meta = DatasetMeta {
        rows: customers.len() as u64,
        channels: by_channel.len() as u64,
        current_weighted_roi: customers.iter().map(|c| c.roi).sum::<f64>() / n,
        current_avg_cltv: customers.iter().map(|c| c.cltv).sum::<f64>() / n,
    };

    debug!(
        rows = meta.rows,
        channels = meta.channels,
        avg_roi = meta.current_weighted_roi,
        avg_cltv = meta.current_avg_cltv,
        "Computed dataset metrics"
    );

    Ok(DatasetAnalysis {
        customers,
        by_channel,
        meta,
    })
}

/// Group customers by channel, ordered by average CLTV (highest first).
pub fn summarize_channels(customers: &[CustomerMetrics]) -> Vec<ChannelSummary> {
    let mut groups: BTreeMap<&str, ChannelAccumulator> = BTreeMap::new();
    for m in customers {
        groups.entry(m.channel.as_str()).or_default().add(m);
    }

    let mut summaries: Vec<ChannelSummary> = groups
        .into_iter()
        .map(|(channel, acc)| acc.finish(channel.to_string()))
        .collect();

    let total_revenue: f64 = summaries.iter().map(|s| s.total_revenue).sum();
    for s in &mut summaries {
        s.revenue_share_pct = if total_revenue != 0.0 {
            100.0 * s.total_revenue / total_revenue
        } else {
            0.0
        };
    }

    // BTreeMap order already sorts by channel, so a stable sort keeps ties alphabetical.
    summaries.sort_by(|a, b| b.avg_cltv.total_cmp(&a.avg_cltv));
    summaries
}
