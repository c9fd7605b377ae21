//! Style-independent view model of one status render.
//!
//! Tier detection, per-model fallback, severity and the context warning are
//! all decided here once, so every presenter draws the same facts.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use unicode_width::UnicodeWidthChar;
use usageline_core::clock::{format_absolute_in, format_countdown_at, Granularity};
use usageline_core::severity::round_percent;
use usageline_core::{Clock, ContextSnapshot, ModelFamily, Severity, Tier, UsageSnapshot};

use crate::input::StatusInput;

/// Everything a presenter needs for one render
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    /// Model label
    pub model: String,
    /// Working directory basename (display-width bounded)
    pub directory: Option<String>,
    /// Current git branch
    pub branch: Option<String>,
    /// Context occupancy, when the transcript yielded one
    pub context: Option<ContextView>,
    /// Quota usage, when a snapshot was available
    pub usage: Option<UsageView>,
}

/// Context occupancy segment
#[derive(Debug, Clone, PartialEq)]
pub struct ContextView {
    pub percent: i64,
    pub tokens: u64,
    pub severity: Severity,
    /// Token count is above the auto-compact threshold
    pub warning: bool,
}

/// Quota section
#[derive(Debug, Clone, PartialEq)]
pub struct UsageView {
    pub tier: Tier,
    pub five_hour: WindowView,
    /// Absent on basic-tier accounts
    pub seven_day: Option<WindowView>,
    /// Per-model sub-limits; empty on basic-tier accounts
    pub models: Vec<ModelView>,
}

/// One rolling window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowView {
    pub label: &'static str,
    pub percent: i64,
    pub severity: Severity,
    /// Relative reset (`2h11m`), empty when unknown
    pub countdown: String,
    /// Wall-clock reset (`6pm`, `Dec 5`), empty when unknown or hidden
    pub absolute: String,
}

/// One per-model sub-limit
#[derive(Debug, Clone, PartialEq)]
pub struct ModelView {
    pub family: ModelFamily,
    /// `None` renders as a neutral placeholder
    pub percent: Option<i64>,
    pub severity: Option<Severity>,
    /// The session is currently using this model family
    pub active: bool,
}

/// View-building knobs taken from settings
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub show_absolute_reset: bool,
    pub max_dir_width: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_absolute_reset: true,
            max_dir_width: 32,
        }
    }
}

impl ContextView {
    /// Text such as `ctx 45% (90k)`
    pub fn label(&self) -> String {
        format!("ctx {}% ({})", self.percent, format_tokens(self.tokens))
    }
}

impl WindowView {
    fn build<Tz>(
        label: &'static str,
        utilization: f64,
        reset_at: Option<&str>,
        granularity: Granularity,
        options: &ViewOptions,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let percent = round_percent(utilization);
        let absolute = if options.show_absolute_reset {
            format_absolute_in(reset_at, granularity, tz)
        } else {
            String::new()
        };
        Self {
            label,
            percent,
            severity: Severity::classify(percent),
            countdown: format_countdown_at(reset_at, granularity, now),
            absolute,
        }
    }

    /// Text such as `5h 44%`
    pub fn headline(&self) -> String {
        format!("{} {}%", self.label, self.percent)
    }

    /// Text such as `⏱ 2h11m (6pm)`, empty when neither part is known
    pub fn reset_text(&self) -> String {
        match (self.countdown.is_empty(), self.absolute.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("⏱ {}", self.countdown),
            (true, false) => format!("⏱ {}", self.absolute),
            (false, false) => format!("⏱ {} ({})", self.countdown, self.absolute),
        }
    }
}

impl ModelView {
    /// Placeholder shown when a sub-limit has no value
    pub const PLACEHOLDER: &'static str = "–";

    /// Text such as `Opus 18%` or `Opus –`
    pub fn label(&self) -> String {
        match self.percent {
            Some(p) => format!("{} {}%", self.family.label(), p),
            None => format!("{} {}", self.family.label(), Self::PLACEHOLDER),
        }
    }
}

impl UsageView {
    /// Derive the quota section from a snapshot
    pub fn build<Tz>(
        snapshot: &UsageSnapshot,
        active: ModelFamily,
        options: &ViewOptions,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let tier = snapshot.tier();
        let five_hour = WindowView::build(
            "5h",
            snapshot.five_hour_utilization,
            snapshot.five_hour_reset_at.as_deref(),
            Granularity::Short,
            options,
            now,
            tz,
        );

        let (seven_day, models) = match (tier, snapshot.seven_day_utilization) {
            (Tier::Higher, Some(seven_day)) => {
                let window = WindowView::build(
                    "7d",
                    seven_day,
                    snapshot.seven_day_reset_at.as_deref(),
                    Granularity::Long,
                    options,
                    now,
                    tz,
                );
                let models = ModelFamily::DISPLAYED
                    .iter()
                    .map(|&family| {
                        let percent = snapshot.model_limit(family).map(round_percent);
                        ModelView {
                            family,
                            percent,
                            severity: percent.map(Severity::classify),
                            active: family == active,
                        }
                    })
                    .collect();
                (Some(window), models)
            }
            _ => (None, Vec::new()),
        };

        Self {
            tier,
            five_hour,
            seven_day,
            models,
        }
    }
}

impl StatusView {
    /// Build the view at `clock`'s time in the local time zone
    pub fn build(
        input: &StatusInput,
        branch: Option<String>,
        context: Option<ContextSnapshot>,
        usage: Option<&UsageSnapshot>,
        options: &ViewOptions,
        clock: &dyn Clock,
    ) -> Self {
        Self::build_in(input, branch, context, usage, options, clock.now(), &Local)
    }

    /// Build the view for an explicit time and display zone
    pub fn build_in<Tz>(
        input: &StatusInput,
        branch: Option<String>,
        context: Option<ContextSnapshot>,
        usage: Option<&UsageSnapshot>,
        options: &ViewOptions,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let active = ModelFamily::from_model_id(&input.model.id);
        Self {
            model: input.model_label().to_string(),
            directory: input
                .current_dir()
                .map(|dir| truncate_to_width(basename(dir), options.max_dir_width)),
            branch,
            context: context.map(|snapshot| ContextView {
                percent: snapshot.percent(),
                tokens: snapshot.token_count,
                severity: snapshot.severity(),
                warning: snapshot.over_threshold(),
            }),
            usage: usage.map(|snapshot| UsageView::build(snapshot, active, options, now, tz)),
        }
    }
}

/// Last path component, or the path itself for `/`
fn basename(dir: &str) -> &str {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() {
        return dir;
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if max == 0 {
        return text.to_string();
    }
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Compact token count: `850`, `90k`, `1.2M`
pub fn format_tokens(tokens: u64) -> String {
    if tokens < 1_000 {
        return tokens.to_string();
    }
    // Decide the unit after rounding so 999.6k reads as 1.0M
    let thousands = (tokens as f64 / 1_000.0).round() as u64;
    if thousands < 1_000 {
        format!("{}k", thousands)
    } else {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    }
}
