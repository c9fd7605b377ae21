//! Usage data types: the cached snapshot, the upstream payload, and the
//! tier / per-model classification derived from them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StatusError;

/// Last successful usage fetch, exactly as persisted in the cache file.
///
/// Only `five_hour_utilization` is required. The 7-day and per-model
/// fields are independently optional and never block rendering of the
/// fields that are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Unix epoch seconds when the snapshot was obtained (0 = unknown)
    #[serde(rename = "timestamp", default)]
    pub fetched_at: i64,
    /// 5-hour window utilization (0-100)
    #[serde(rename = "five_hour")]
    pub five_hour_utilization: f64,
    /// 5-hour window reset timestamp, as sent upstream
    #[serde(rename = "five_hour_resets", default)]
    pub five_hour_reset_at: Option<String>,
    /// 7-day window utilization; absent on basic-tier accounts
    #[serde(rename = "seven_day", default)]
    pub seven_day_utilization: Option<f64>,
    /// 7-day window reset timestamp
    #[serde(rename = "seven_day_resets", default)]
    pub seven_day_reset_at: Option<String>,
    /// Dedicated Opus sub-limit, if the account has one
    #[serde(rename = "seven_day_opus", default)]
    pub seven_day_opus_utilization: Option<f64>,
    /// Dedicated Sonnet sub-limit, if the account has one
    #[serde(rename = "seven_day_sonnet", default)]
    pub seven_day_sonnet_utilization: Option<f64>,
}

/// Account capability level, derived from which windows upstream reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Only the 5-hour window exists
    Basic,
    /// A 7-day window (and per-model sub-limits) exists
    Higher,
}

/// Model family for per-model sub-limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Opus,
    Sonnet,
    Haiku,
    Other,
}

impl ModelFamily {
    /// Families that have a per-model line, in display order
    pub const DISPLAYED: [ModelFamily; 2] = [ModelFamily::Opus, ModelFamily::Sonnet];

    /// Detect the family from a model id such as `claude-opus-4-1-20250805`
    pub fn from_model_id(model_id: &str) -> Self {
        let lower = model_id.to_ascii_lowercase();
        if lower.contains("opus") {
            Self::Opus
        } else if lower.contains("sonnet") {
            Self::Sonnet
        } else if lower.contains("haiku") {
            Self::Haiku
        } else {
            Self::Other
        }
    }

    /// Short human label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Opus => "Opus",
            Self::Sonnet => "Sonnet",
            Self::Haiku => "Haiku",
            Self::Other => "Model",
        }
    }
}

impl UsageSnapshot {
    /// Build a snapshot from an upstream payload.
    ///
    /// Fails with `FetchInvalid` when the 5-hour utilization is missing.
    pub fn from_api(api: UsageApiResponse, fetched_at: i64) -> Result<Self, StatusError> {
        let five_hour = api
            .five_hour
            .ok_or_else(|| StatusError::invalid("missing five_hour window"))?;
        let five_hour_utilization = five_hour
            .utilization
            .ok_or_else(|| StatusError::invalid("missing five_hour utilization"))?;

        let (seven_day_utilization, seven_day_reset_at) = match api.seven_day {
            Some(w) => (w.utilization, w.resets_at),
            None => (None, None),
        };

        Ok(Self {
            fetched_at,
            five_hour_utilization,
            five_hour_reset_at: five_hour.resets_at,
            seven_day_utilization,
            seven_day_reset_at,
            seven_day_opus_utilization: api.seven_day_opus.and_then(|w| w.utilization),
            seven_day_sonnet_utilization: api.seven_day_sonnet.and_then(|w| w.utilization),
        })
    }

    /// Whether the snapshot is younger than `ttl` at `now` (epoch seconds).
    ///
    /// A missing or zero `fetched_at` is infinitely stale; an age equal to
    /// the TTL is stale.
    pub fn is_fresh_at(&self, ttl: Duration, now: i64) -> bool {
        if self.fetched_at <= 0 {
            return false;
        }
        let age = now.saturating_sub(self.fetched_at);
        i128::from(age) < i128::from(ttl.as_secs())
    }

    /// Tier classification: basic iff there is no 7-day window at all
    pub fn tier(&self) -> Tier {
        if self.seven_day_utilization.is_some() {
            Tier::Higher
        } else {
            Tier::Basic
        }
    }

    /// Utilization for a model family's 7-day sub-limit.
    ///
    /// A missing dedicated sub-limit falls back to the blanket 7-day value.
    pub fn model_limit(&self, family: ModelFamily) -> Option<f64> {
        let dedicated = match family {
            ModelFamily::Opus => self.seven_day_opus_utilization,
            ModelFamily::Sonnet => self.seven_day_sonnet_utilization,
            ModelFamily::Haiku | ModelFamily::Other => None,
        };
        dedicated.or(self.seven_day_utilization)
    }
}

/// Usage endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageApiResponse {
    #[serde(default)]
    pub five_hour: Option<UsageWindowApi>,
    #[serde(default)]
    pub seven_day: Option<UsageWindowApi>,
    #[serde(default)]
    pub seven_day_opus: Option<UsageWindowApi>,
    #[serde(default)]
    pub seven_day_sonnet: Option<UsageWindowApi>,
}

/// One rolling window in the usage endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageWindowApi {
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default)]
    pub resets_at: Option<String>,
}
