//! Chart-ready series for the dashboard: histograms, per-channel bars, the
//! revenue donut and CLTV box plots. Rendering is left to the client.

use cltv_core::{ChannelSummary, CustomerMetrics};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fraction of the pie radius left empty in the revenue donut.
pub const REVENUE_PIE_HOLE: f64 = 0.6;

/// Tukey fence multiplier for box-plot whiskers.
const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Histogram {
    pub title: String,
    pub x: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BarChart {
    pub title: String,
    pub x: String,
    pub y: String,
    pub bars: Vec<BarPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PieChart {
    pub title: String,
    pub hole: f64,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoxStats {
    pub group: String,
    pub count: u64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoxPlot {
    pub title: String,
    pub x: String,
    pub y: String,
    pub groups: Vec<BoxStats>,
}

/// Channel-summary column that a bar chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelField {
    AvgCost,
    AvgConvRate,
    AvgRoi,
    AvgCltv,
}

impl ChannelField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::AvgCost => "avg_cost",
            Self::AvgConvRate => "avg_conv_rate",
            Self::AvgRoi => "avg_roi",
            Self::AvgCltv => "avg_cltv",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::AvgCost => "Customer Acquisition Cost by Channel",
            Self::AvgConvRate => "Conversion Rate by Channel",
            Self::AvgRoi => "Return on Investment (ROI) by Channel",
            Self::AvgCltv => "Customer Lifetime Value (CLTV) by Channel",
        }
    }

    fn value(&self, s: &ChannelSummary) -> f64 {
        match self {
            Self::AvgCost => s.avg_cost,
            Self::AvgConvRate => s.avg_conv_rate,
            Self::AvgRoi => s.avg_roi,
            Self::AvgCltv => s.avg_cltv,
        }
    }
}

/// Equal-width histogram over `[min, max]`. The last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize, x: &str, title: &str) -> Histogram {
    Histogram {
        title: title.to_string(),
        x: x.to_string(),
        bins: bin_values(values, bins.max(1)),
    }
}

fn bin_values(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len() as u64,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn bar(by_channel: &[ChannelSummary], field: ChannelField) -> BarChart {
    BarChart {
        title: field.title().to_string(),
        x: "channel".to_string(),
        y: field.column().to_string(),
        bars: by_channel
            .iter()
            .map(|s| BarPoint {
                label: s.channel.clone(),
                value: field.value(s),
            })
            .collect(),
    }
}

pub fn revenue_pie(by_channel: &[ChannelSummary]) -> PieChart {
    PieChart {
        title: "Total Revenue by Channel".to_string(),
        hole: REVENUE_PIE_HOLE,
        slices: by_channel
            .iter()
            .map(|s| PieSlice {
                label: s.channel.clone(),
                value: s.total_revenue,
            })
            .collect(),
    }
}

/// CLTV box plot per channel, groups in order of first appearance.
pub fn cltv_box(customers: &[CustomerMetrics]) -> BoxPlot {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for c in customers {
        match groups.iter_mut().find(|(ch, _)| *ch == c.channel) {
            Some((_, values)) => values.push(c.cltv),
            None => groups.push((c.channel.as_str(), vec![c.cltv])),
        }
    }

    BoxPlot {
        title: "CLTV Distribution by Channel".to_string(),
        x: "channel".to_string(),
        y: "cltv".to_string(),
        groups: groups
            .into_iter()
            .filter_map(|(ch, values)| box_stats(ch, values))
            .collect(),
    }
}

/// Five-number summary with Tukey whiskers. `None` for an empty group.
pub fn box_stats(group: &str, mut values: Vec<f64>) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - WHISKER_IQR * iqr;
    let upper_fence = q3 + WHISKER_IQR * iqr;

    let inside = values.iter().copied().filter(|v| *v >= lower_fence && *v <= upper_fence);
    let lower_whisker = inside.clone().reduce(f64::min).unwrap_or(q1);
    let upper_whisker = inside.reduce(f64::max).unwrap_or(q3);

    Some(BoxStats {
        group: group.to_string(),
        count: values.len() as u64,
        min: values[0],
        q1,
        median,
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers: values
            .iter()
            .copied()
            .filter(|v| *v < lower_fence || *v > upper_fence)
            .collect(),
    })
}

/// Linear-interpolation quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
