//! Context-window occupancy estimated from the conversation transcript.
//!
//! The most recent primary-thread entry carrying a usage record decides the
//! token count. Only the last [`TAIL_WINDOW`] entries are scanned, so a tail
//! made up entirely of side-channel or error entries reports nothing rather
//! than searching further back.

pub mod transcript;

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::StatusError;
use crate::severity::{round_percent, Severity};
use crate::{DEFAULT_AUTO_COMPACT_THRESHOLD, DEFAULT_CONTEXT_WINDOW};

pub use transcript::read_tail_lines;

/// Number of trailing transcript entries examined per estimate
pub const TAIL_WINDOW: usize = 100;

/// One JSONL transcript entry (only the fields the estimate needs)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptEntry {
    #[serde(default)]
    is_sidechain: Option<bool>,
    #[serde(default)]
    is_api_error_message: Option<bool>,
    #[serde(default)]
    message: Option<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u64>,
}

impl TokenUsage {
    fn context_tokens(&self) -> u64 {
        self.input_tokens
            .unwrap_or(0)
            .saturating_add(self.cache_read_input_tokens.unwrap_or(0))
            .saturating_add(self.cache_creation_input_tokens.unwrap_or(0))
    }
}

/// Token count of the first valid usage record in `lines`, newest first.
///
/// Side-channel and API-error entries are skipped, as are lines that are
/// not JSON objects of the expected shape.
pub fn latest_context_tokens<'a, I>(newest_first: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    newest_first.into_iter().find_map(|line| {
        let entry: TranscriptEntry = serde_json::from_str(line).ok()?;
        if entry.is_sidechain.unwrap_or(false) || entry.is_api_error_message.unwrap_or(false) {
            return None;
        }
        entry.message?.usage.map(|usage| usage.context_tokens())
    })
}

/// Context occupancy for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// Tokens currently in the context window
    pub token_count: u64,
    /// Maximum context window size
    pub window_size: u64,
    /// Token count above which the conversation is auto-compacted
    pub auto_compact_threshold: u64,
}

impl ContextSnapshot {
    /// Occupancy as a fraction of the window (may exceed 1.0)
    pub fn occupancy_ratio(&self) -> f64 {
        if self.window_size == 0 {
            return 0.0;
        }
        self.token_count as f64 / self.window_size as f64
    }

    /// Occupancy as a whole percent
    pub fn percent(&self) -> i64 {
        round_percent(self.occupancy_ratio() * 100.0)
    }

    /// Severity band of the occupancy percent
    pub fn severity(&self) -> Severity {
        Severity::classify(self.percent())
    }

    /// Whether the auto-compact threshold has been crossed
    pub fn over_threshold(&self) -> bool {
        self.token_count > self.auto_compact_threshold
    }
}

/// Scans transcripts for the current context size
#[derive(Debug, Clone, Copy)]
pub struct ContextEstimator {
    window_size: u64,
    auto_compact_threshold: u64,
    tail_window: usize,
}

impl Default for ContextEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW, DEFAULT_AUTO_COMPACT_THRESHOLD)
    }
}

impl ContextEstimator {
    pub fn new(window_size: u64, auto_compact_threshold: u64) -> Self {
        Self {
            window_size,
            auto_compact_threshold,
            tail_window: TAIL_WINDOW,
        }
    }

    /// Override how many trailing entries are examined
    pub fn with_tail_window(mut self, tail_window: usize) -> Self {
        self.tail_window = tail_window;
        self
    }

    /// Token count of the latest valid usage record, or `None`.
    ///
    /// An empty path, a missing file, or a tail without any usable entry
    /// all yield `None`.
    pub fn estimate_tokens(&self, transcript_path: &str) -> Option<u64> {
        match self.try_estimate_tokens(transcript_path) {
            Ok(found) => found,
            Err(e) => {
                debug!("Context unavailable: {}", e);
                None
            }
        }
    }

    fn try_estimate_tokens(&self, transcript_path: &str) -> Result<Option<u64>, StatusError> {
        if transcript_path.trim().is_empty() {
            return Err(StatusError::TranscriptUnavailable(
                "no transcript path".to_string(),
            ));
        }
        let path = Path::new(transcript_path);
        if !path.exists() {
            return Err(StatusError::TranscriptUnavailable(format!(
                "{:?} does not exist",
                path
            )));
        }

        let lines = read_tail_lines(path, self.tail_window)
            .map_err(|e| StatusError::TranscriptUnavailable(format!("{:#}", e)))?;

        Ok(latest_context_tokens(lines.iter().rev().map(String::as_str)))
    }

    /// Full context snapshot for `transcript_path`, or `None`
    pub fn estimate(&self, transcript_path: &str) -> Option<ContextSnapshot> {
        self.estimate_tokens(transcript_path)
            .map(|token_count| ContextSnapshot {
                token_count,
                window_size: self.window_size,
                auto_compact_threshold: self.auto_compact_threshold,
            })
    }
}
