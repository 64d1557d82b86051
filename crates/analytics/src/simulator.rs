//! Budget reallocation simulator.
//!
//! Compares the ROI and CLTV the current revenue mix produces against a target
//! mix of channel weights. Each channel contributes its average ROI and CLTV in
//! proportion to its weight.

use cltv_core::{ChannelSummary, DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use utoipa::ToSchema;

/// Allocation shown to users before they edit it.
pub const DEFAULT_ALLOCATION: &str =
    r#"{ "email marketing": 20, "paid advertising": 10, "referral": 35, "social media": 35 }"#;

/// Keeps percentage changes finite when the current value is zero.
const CHANGE_EPSILON: f64 = 1e-9;

/// Target channel weights. Any scale is accepted; weights are normalised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Allocation(pub BTreeMap<String, f64>);

impl Allocation {
    /// Weights scaled to sum to 1.0. A zero total is treated as 1.0.
    pub fn normalized(&self) -> BTreeMap<String, f64> {
        let sum: f64 = self.0.values().sum();
        let sum = if sum == 0.0 { 1.0 } else { sum };
        self.0.iter().map(|(k, v)| (k.clone(), v / sum)).collect()
    }
}

/// Parse a JSON object of `channel -> weight`. Blank input is an empty allocation.
pub fn parse_allocation(text: &str) -> DashboardResult<Allocation> {
    if text.trim().is_empty() {
        return Ok(Allocation::default());
    }

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|_| DashboardError::InvalidAllocation("Invalid JSON.".to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        DashboardError::InvalidAllocation(
            "allocation must be a JSON object of channel weights".to_string(),
        )
    })?;

    let mut weights = BTreeMap::new();
    for (channel, weight) in object {
        let w = weight.as_f64().ok_or_else(|| {
            DashboardError::InvalidAllocation(format!("weight for '{channel}' is not a number"))
        })?;
        if !w.is_finite() || w < 0.0 {
            return Err(DashboardError::InvalidAllocation(format!(
                "weight for '{channel}' must be a non-negative number"
            )));
        }
        weights.insert(channel.clone(), w);
    }
    Ok(Allocation(weights))
}

/// Before/after KPIs for a reallocation, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimulationOutcome {
    pub current_weighted_roi: f64,
    pub new_weighted_roi: f64,
    #[serde(rename = "roi_change_%")]
    pub roi_change_pct: f64,
    pub current_weighted_cltv: f64,
    pub new_weighted_cltv: f64,
    #[serde(rename = "cltv_change_%")]
    pub cltv_change_pct: f64,
}

impl SimulationOutcome {
    /// Human-readable summary, e.g. `**ROI**: 3.00 ➜ 4.00 (**+33.33%**)`.
    pub fn summary_markdown(&self) -> String {
        format!(
            "**ROI**: {:.2} ➜ {:.2} (**{:+.2}%**)\n\n**CLTV**: {:.2} ➜ {:.2} (**{:+.2}%**)",
            self.current_weighted_roi,
            self.new_weighted_roi,
            self.roi_change_pct,
            self.current_weighted_cltv,
            self.new_weighted_cltv,
            self.cltv_change_pct,
        )
    }
}

/// Two-decimal rounding with exact ties going to the even digit.
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

fn change_pct(current: f64, new: f64) -> f64 {
    100.0 * (new - current) / (current + CHANGE_EPSILON)
}

/// Run a reallocation against a channel summary.
pub fn simulate(
    by_channel: &[ChannelSummary],
    allocation: &Allocation,
) -> DashboardResult<SimulationOutcome> {
    if by_channel.is_empty() {
        return Err(DashboardError::NoData);
    }

    let kpis: BTreeMap<&str, &ChannelSummary> =
        by_channel.iter().map(|s| (s.channel.as_str(), s)).collect();

    if let Some(unknown) = allocation.0.keys().find(|k| !kpis.contains_key(k.as_str())) {
        return Err(DashboardError::UnknownChannel(unknown.clone()));
    }

    let weights = allocation.normalized();
    let weight = |ch: &str| weights.get(ch).copied().unwrap_or(0.0);

    let new_roi: f64 = by_channel.iter().map(|s| s.avg_roi * weight(&s.channel)).sum();
    let new_cltv: f64 = by_channel.iter().map(|s| s.avg_cltv * weight(&s.channel)).sum();

    let cur_roi: f64 = by_channel
        .iter()
        .map(|s| s.avg_roi * s.revenue_share_pct / 100.0)
        .sum();
    let cur_cltv: f64 = by_channel
        .iter()
        .map(|s| s.avg_cltv * s.revenue_share_pct / 100.0)
        .sum();

    let outcome = SimulationOutcome {
        current_weighted_roi: round2(cur_roi),
        new_weighted_roi: round2(new_roi),
        roi_change_pct: round2(change_pct(cur_roi, new_roi)),
        current_weighted_cltv: round2(cur_cltv),
        new_weighted_cltv: round2(new_cltv),
        cltv_change_pct: round2(change_pct(cur_cltv, new_cltv)),
    };

    metrics::counter!("simulations.run").increment(1);
    info!(
        channels = allocation.0.len(),
        roi_change_pct = outcome.roi_change_pct,
        cltv_change_pct = outcome.cltv_change_pct,
        "Reallocation simulated"
    );

    Ok(outcome)
}
