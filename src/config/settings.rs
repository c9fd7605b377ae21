use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use usageline_core::usage::DEFAULT_USAGE_ENDPOINT;
use usageline_core::{
    DEFAULT_AUTO_COMPACT_THRESHOLD, DEFAULT_CACHE_TTL_SECS, DEFAULT_CONTEXT_WINDOW,
};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Claude Code status line: quota usage, per-model limits and context occupancy"
)]
pub struct Config {
    /// Enable debug logging (stderr)
    #[arg(short, long)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rendering style
    #[arg(long, value_enum)]
    pub style: Option<RenderStyle>,

    /// Disable colored output (also respects NO_COLOR)
    #[arg(long)]
    pub no_color: bool,

    /// Skip the usage section (no cache read, no network)
    #[arg(long)]
    pub no_usage: bool,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Presentation strategy for the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RenderStyle {
    /// Colored text separated by thin dividers
    #[default]
    Plain,
    /// Background-colored segments joined by powerline arrows
    Powerline,
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Lifetime of the cached usage snapshot in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Timeout for the usage request in milliseconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    /// Context window size in tokens
    #[serde(default = "default_context_window")]
    pub context_window: u64,

    /// Token count above which the context warning is shown
    #[serde(default = "default_auto_compact_threshold")]
    pub auto_compact_threshold: u64,

    /// Override for the usage cache file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// Usage endpoint URL
    #[serde(default = "default_usage_endpoint")]
    pub usage_endpoint: String,

    /// Whether to show the usage section at all
    #[serde(default = "default_usage_enabled")]
    pub usage_enabled: bool,

    /// Display settings
    #[serde(default)]
    pub display: DisplaySettings,
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_http_timeout() -> u64 {
    2000
}

fn default_context_window() -> u64 {
    DEFAULT_CONTEXT_WINDOW
}

fn default_auto_compact_threshold() -> u64 {
    DEFAULT_AUTO_COMPACT_THRESHOLD
}

fn default_usage_endpoint() -> String {
    DEFAULT_USAGE_ENDPOINT.to_string()
}

fn default_usage_enabled() -> bool {
    true
}

/// Display-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Rendering style
    #[serde(default)]
    pub style: RenderStyle,

    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Show the git branch of the working directory
    #[serde(default = "default_show_branch")]
    pub show_branch: bool,

    /// Show wall-clock reset times next to countdowns
    #[serde(default = "default_show_absolute_reset")]
    pub show_absolute_reset: bool,

    /// Maximum display width of the directory name (0 = unlimited)
    #[serde(default = "default_max_dir_width")]
    pub max_dir_width: usize,
}

fn default_color() -> bool {
    true
}

fn default_show_branch() -> bool {
    true
}

fn default_show_absolute_reset() -> bool {
    true
}

fn default_max_dir_width() -> usize {
    32
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            style: RenderStyle::default(),
            color: default_color(),
            show_branch: default_show_branch(),
            show_absolute_reset: default_show_absolute_reset(),
            max_dir_width: default_max_dir_width(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            http_timeout_ms: default_http_timeout(),
            context_window: default_context_window(),
            auto_compact_threshold: default_auto_compact_threshold(),
            cache_path: None,
            usage_endpoint: default_usage_endpoint(),
            usage_enabled: default_usage_enabled(),
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("usageline/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/usageline/config.toml")),
            dirs::home_dir().map(|p| p.join(".usageline.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn load_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(style) = cli.style {
            self.display.style = style;
        }
        if cli.no_color {
            self.display.color = false;
        }
        if cli.no_usage {
            self.usage_enabled = false;
        }
    }

    /// Apply environment conventions (`NO_COLOR`)
    pub fn merge_env(&mut self) {
        if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.display.color = false;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Keeps the TTL and window positive and the threshold inside the window.
    pub fn validate(&mut self) {
        if self.cache_ttl_secs < 1 {
            self.cache_ttl_secs = 1;
        }
        if self.context_window < 1 {
            self.context_window = default_context_window();
        }
        if self.auto_compact_threshold > self.context_window {
            self.auto_compact_threshold = self.context_window;
        }
        if self.http_timeout_ms < 1 {
            self.http_timeout_ms = default_http_timeout();
        }
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// HTTP timeout as a duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Effective settings rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }
}
