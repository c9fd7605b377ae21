//! Time utilities: the injectable clock, reset-timestamp parsing, and the
//! two display forms of a reset (relative countdown and local wall time).

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::error::StatusError;

/// Source of the current time
pub trait Clock {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as Unix epoch seconds
    fn epoch_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freeze the clock at the given epoch seconds
    pub fn at_epoch(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Display granularity of a rolling window's reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 5-hour window: `2h11m` / `45m`, absolute `6pm` / `6:30pm`
    Short,
    /// 7-day window: `3d4h` / `7h`, absolute `Dec 5`
    Long,
}

/// Parse an upstream reset timestamp.
///
/// Accepts RFC 3339 with any offset and fractional seconds. A timestamp
/// without an offset is taken as UTC.
pub fn try_parse_reset(raw: &str) -> Result<DateTime<Utc>, StatusError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Err(StatusError::TimestampParse(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| StatusError::TimestampParse(raw.to_string()))
}

/// Parse an optional reset timestamp, logging and discarding failures
pub fn parse_reset(raw: Option<&str>) -> Option<DateTime<Utc>> {
    match try_parse_reset(raw?) {
        Ok(dt) => Some(dt),
        Err(e) => {
            debug!("Omitting reset time: {}", e);
            None
        }
    }
}

/// Countdown until `reset_at`, relative to the system clock
pub fn format_countdown(reset_at: Option<&str>, granularity: Granularity) -> String {
    format_countdown_at(reset_at, granularity, Utc::now())
}

/// Countdown until `reset_at`, relative to `now`.
///
/// Returns an empty string when the timestamp is missing or malformed.
/// A reset at or before `now` renders as `0m`.
pub fn format_countdown_at(
    reset_at: Option<&str>,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> String {
    let Some(reset) = parse_reset(reset_at) else {
        return String::new();
    };

    let remaining = (reset - now).num_seconds();
    if remaining <= 0 {
        return "0m".to_string();
    }

    match granularity {
        Granularity::Short => {
            let minutes = remaining / 60;
            let (h, m) = (minutes / 60, minutes % 60);
            if h > 0 {
                format!("{}h{}m", h, m)
            } else {
                format!("{}m", m)
            }
        }
        Granularity::Long => {
            let hours = remaining / 3600;
            let (d, h) = (hours / 24, hours % 24);
            if d > 0 {
                format!("{}d{}h", d, h)
            } else {
                format!("{}h", h)
            }
        }
    }
}

/// Reset time in the machine's local time zone
pub fn format_absolute(reset_at: Option<&str>, granularity: Granularity) -> String {
    format_absolute_in(reset_at, granularity, &Local)
}

/// Reset time rendered in `tz`.
///
/// Short granularity is a 12-hour clock that only shows minutes when they
/// are non-zero (`6pm`, `6:30pm`); long granularity is month and day
/// (`Dec 5`). Missing or malformed timestamps yield an empty string.
pub fn format_absolute_in<Tz>(reset_at: Option<&str>, granularity: Granularity, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(reset) = parse_reset(reset_at) else {
        return String::new();
    };
    let local = reset.with_timezone(tz);

    match granularity {
        Granularity::Short if local.minute() == 0 => local.format("%-I%P").to_string(),
        Granularity::Short => local.format("%-I:%M%P").to_string(),
        Granularity::Long => local.format("%b %-d").to_string(),
    }
}
