//! Fetches a fresh usage snapshot and writes it back to the cache.

use tracing::{debug, warn};

use super::cache::CacheStore;
use super::credentials::{default_credentials, CredentialSource};
use super::transport::{HttpTransport, UsageTransport};
use super::types::{UsageApiResponse, UsageSnapshot};
use crate::error::StatusError;

/// Credential lookup + one HTTP GET + normalization
pub struct UsageFetcher {
    credentials: Box<dyn CredentialSource>,
    transport: Box<dyn UsageTransport>,
}

impl Default for UsageFetcher {
    fn default() -> Self {
        Self::new(
            Box::new(default_credentials()),
            Box::new(HttpTransport::default()),
        )
    }
}

impl UsageFetcher {
    pub fn new(
        credentials: Box<dyn CredentialSource>,
        transport: Box<dyn UsageTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Fetch usage and persist it to `store`.
    ///
    /// 1. Resolve the bearer token (no network call without one)
    /// 2. GET the usage endpoint
    /// 3. Reject empty bodies and payloads without a 5-hour utilization
    /// 4. Stamp the snapshot with `now` and replace the cache entry
    ///
    /// A failed cache write is logged; the in-memory snapshot is still returned.
    pub fn fetch(&self, store: &dyn CacheStore, now: i64) -> Result<UsageSnapshot, StatusError> {
        let token = self.credentials.token()?;
        let body = self.transport.get_usage(&token)?;
        let snapshot = parse_usage_response(&body, now)?;

        match store.write(&snapshot) {
            Ok(()) => debug!("Usage fetch: cached snapshot at {}", now),
            Err(e) => warn!("Usage fetch: {}", e),
        }

        Ok(snapshot)
    }
}

/// Normalize a raw usage response body into a snapshot
pub fn parse_usage_response(body: &str, fetched_at: i64) -> Result<UsageSnapshot, StatusError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(StatusError::invalid("empty response body"));
    }

    let api: UsageApiResponse = serde_json::from_str(trimmed)
        .map_err(|e| StatusError::invalid(format!("malformed response: {}", e)))?;

    UsageSnapshot::from_api(api, fetched_at)
}
