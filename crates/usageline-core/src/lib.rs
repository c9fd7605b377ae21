//! usageline-core - the telemetry engine behind the `usageline` status line.
//!
//! Four pieces carry all of the policy:
//! - [`usage::FileCacheStore`]: a single TTL-bounded snapshot on disk
//! - [`usage::UsageFetcher`]: credential lookup, one HTTP GET, normalization
//! - [`clock`]: reset timestamps turned into countdowns and local times
//! - [`context::ContextEstimator`]: backward scan of the transcript tail
//!
//! [`usage::UsageProvider`] is the only entry point the display layer uses
//! for quota data. Nothing here is fatal: every failure degrades to "absent".

pub mod clock;
pub mod context;
pub mod error;
pub mod paths;
pub mod severity;
pub mod usage;

pub use clock::{Clock, FixedClock, Granularity, SystemClock};
pub use context::{ContextEstimator, ContextSnapshot};
pub use error::StatusError;
pub use severity::Severity;
pub use usage::{ModelFamily, Tier, UsageProvider, UsageSnapshot};

/// Default lifetime of a cached usage snapshot, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default context window size, in tokens
pub const DEFAULT_CONTEXT_WINDOW: u64 = 200_000;

/// Default auto-compact threshold (80% of the default window), in tokens
pub const DEFAULT_AUTO_COMPACT_THRESHOLD: u64 = 160_000;
