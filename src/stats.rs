//! Windowed aggregates over a risk history.

use serde::Serialize;

/// Seconds between consecutive samples at the nominal 10 Hz replay rate.
pub const SAMPLE_INTERVAL_SECONDS: f64 = 0.1;

const HIGH_RISK_THRESHOLD: f64 = 80.0;
const CRITICAL_RISK_THRESHOLD: f64 = 90.0;
const ALERT_THRESHOLD: f64 = 65.0;

/// Direction of the risk trend, first half vs second half of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    #[serde(rename = "No data")]
    NoData,
    #[serde(rename = "Insufficient data")]
    InsufficientData,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Increasing")]
    Increasing,
    #[serde(rename = "Strongly Increasing")]
    StronglyIncreasing,
    #[serde(rename = "Decreasing")]
    Decreasing,
    #[serde(rename = "Strongly Decreasing")]
    StronglyDecreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendDirection::NoData => "No data",
            TrendDirection::InsufficientData => "Insufficient data",
            TrendDirection::Stable => "Stable",
            TrendDirection::Increasing => "Increasing",
            TrendDirection::StronglyIncreasing => "Strongly Increasing",
            TrendDirection::Decreasing => "Decreasing",
            TrendDirection::StronglyDecreasing => "Strongly Decreasing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub high_risk_time_minutes: f64,
    pub critical_risk_time_minutes: f64,
    pub time_above_threshold_minutes: f64,
    pub average_risk: f64,
    pub max_risk: f64,
    pub trend_direction: TrendDirection,
}

impl Default for TrendSummary {
    fn default() -> Self {
        TrendSummary {
            high_risk_time_minutes: 0.0,
            critical_risk_time_minutes: 0.0,
            time_above_threshold_minutes: 0.0,
            average_risk: 0.0,
            max_risk: 0.0,
            trend_direction: TrendDirection::NoData,
        }
    }
}

/// Summarize a risk history sampled at `interval_seconds`.
pub fn summarize(risks: &[f64], interval_seconds: f64) -> TrendSummary {
    if risks.is_empty() {
        return TrendSummary::default();
    }

    let minutes = |count: usize| count as f64 * interval_seconds / 60.0;
    let high = risks.iter().filter(|&&r| r >= HIGH_RISK_THRESHOLD).count();
    let critical = risks
        .iter()
        .filter(|&&r| r >= CRITICAL_RISK_THRESHOLD)
        .count();
    let above = risks.iter().filter(|&&r| r >= ALERT_THRESHOLD).count();

    let average = risks.iter().sum::<f64>() / risks.len() as f64;
    let max = risks.iter().copied().fold(f64::MIN, f64::max);

    TrendSummary {
        high_risk_time_minutes: minutes(high),
        critical_risk_time_minutes: minutes(critical),
        time_above_threshold_minutes: minutes(above),
        average_risk: average,
        max_risk: max,
        trend_direction: trend_direction(risks),
    }
}

fn trend_direction(risks: &[f64]) -> TrendDirection {
    let n = risks.len();
    if n <= 5 {
        return TrendDirection::InsufficientData;
    }
    let half = n / 2;
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let diff = mean(&risks[half..]) - mean(&risks[..half]);
    if diff > 5.0 {
        TrendDirection::StronglyIncreasing
    } else if diff > 1.0 {
        TrendDirection::Increasing
    } else if diff < -5.0 {
        TrendDirection::StronglyDecreasing
    } else if diff < -1.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}
