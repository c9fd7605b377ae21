//! Cache-or-fetch orchestration: the only usage entry point for display code.

use std::time::Duration;

use tracing::debug;

use super::cache::{CacheStore, FileCacheStore};
use super::fetcher::UsageFetcher;
use super::types::UsageSnapshot;
use crate::clock::{Clock, SystemClock};

/// Serves usage snapshots from the cache while fresh, fetching otherwise
pub struct UsageProvider {
    store: Box<dyn CacheStore>,
    fetcher: UsageFetcher,
    clock: Box<dyn Clock>,
}

impl Default for UsageProvider {
    fn default() -> Self {
        Self::new(
            Box::new(FileCacheStore::default()),
            UsageFetcher::default(),
            Box::new(SystemClock),
        )
    }
}

impl UsageProvider {
    pub fn new(store: Box<dyn CacheStore>, fetcher: UsageFetcher, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            fetcher,
            clock,
        }
    }

    /// Clock used for freshness checks
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current usage, or `None` when nothing can be shown.
    ///
    /// A fresh cache entry is returned without touching the network. A stale
    /// or missing entry triggers one fetch; any fetch failure yields `None`
    /// and the next call after the TTL retries naturally.
    pub fn get_usage(&self, ttl: Duration) -> Option<UsageSnapshot> {
        let now = self.clock.epoch_secs();

        if self.store.is_fresh(ttl, now) {
            // The entry may vanish between the two reads; fall through to a fetch
            if let Some(cached) = self.store.read() {
                debug!("Usage cache hit (age {}s)", now - cached.fetched_at);
                return Some(cached);
            }
        }

        match self.fetcher.fetch(self.store.as_ref(), now) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Usage unavailable: {}", e);
                None
            }
        }
    }
}
