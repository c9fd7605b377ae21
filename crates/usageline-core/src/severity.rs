//! Percentage severity bands used for coloring and warnings.

use serde::Serialize;

/// Severity band of a 0-100 ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// At most 50
    Low,
    /// 51 through 80
    Medium,
    /// Above 80
    High,
}

impl Severity {
    /// Classify an integer percentage. Total over `i64`: negatives are `Low`.
    pub fn classify(percent: i64) -> Self {
        if percent <= 50 {
            Self::Low
        } else if percent <= 80 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Classify a fractional utilization after rounding to a whole percent
    pub fn from_utilization(utilization: f64) -> Self {
        Self::classify(round_percent(utilization))
    }
}

/// Round a utilization ratio to the integer percent shown to the user
pub fn round_percent(utilization: f64) -> i64 {
    if utilization.is_finite() {
        utilization.round() as i64
    } else {
        0
    }
}
