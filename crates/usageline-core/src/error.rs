//! Error taxonomy for the telemetry engine.
//!
//! Every variant is recovered locally. Public entry points turn these into
//! `None` or an empty string after logging, so callers only ever see
//! "absent" rather than a failure.

use thiserror::Error;

/// Error type for usage, cache, transcript and timestamp operations
#[derive(Debug, Error)]
pub enum StatusError {
    /// No bearer token could be resolved; no network call was attempted
    #[error("credential unavailable: {reason}")]
    CredentialUnavailable { reason: String },

    /// The usage endpoint could not be reached
    #[error("network unavailable: {0}")]
    Network(String),

    /// The usage endpoint did not answer within the configured timeout
    #[error("usage request timed out")]
    Timeout,

    /// The usage endpoint answered with a non-success status
    #[error("usage endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// The response was empty, malformed, or lacked the 5-hour utilization
    #[error("invalid usage response: {reason}")]
    FetchInvalid { reason: String },

    /// The cache file is missing or could not be decoded
    #[error("cache read failed: {0}")]
    CacheRead(String),

    /// The cache file could not be replaced
    #[error("cache write failed: {0}")]
    CacheWrite(#[from] anyhow::Error),

    /// The transcript file is missing or unreadable
    #[error("transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    /// A reset timestamp could not be parsed
    #[error("unparseable timestamp: {0:?}")]
    TimestampParse(String),
}

impl StatusError {
    /// Build a `FetchInvalid` error from any message
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::FetchInvalid {
            reason: reason.into(),
        }
    }

    /// Build a `CredentialUnavailable` error from any message
    pub fn no_credential(reason: impl Into<String>) -> Self {
        Self::CredentialUnavailable {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StatusError::no_credential("file missing").to_string(),
            "credential unavailable: file missing"
        );
        assert_eq!(
            StatusError::HttpStatus(401).to_string(),
            "usage endpoint returned HTTP 401"
        );
        assert_eq!(
            StatusError::TimestampParse("soon".into()).to_string(),
            "unparseable timestamp: \"soon\""
        );
    }

    #[test]
    fn test_cache_write_from_anyhow() {
        let err: StatusError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, StatusError::CacheWrite(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
