//! On-disk cache holding the single most recent usage snapshot.
//!
//! The file is shared across process invocations without locking. Writers
//! replace it atomically (temp file + rename, last writer wins) and readers
//! treat any I/O or decode failure as "not found".

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use super::types::UsageSnapshot;
use crate::error::StatusError;
use crate::paths::{ensure_private_dir, usage_cache_path};

/// Storage for the cached usage snapshot
pub trait CacheStore {
    /// Read the cached snapshot. Never fails hard: anything wrong is `None`.
    fn read(&self) -> Option<UsageSnapshot>;

    /// Replace the cached snapshot with `snapshot`
    fn write(&self, snapshot: &UsageSnapshot) -> Result<(), StatusError>;

    /// Whether a cached snapshot exists and is younger than `ttl` at `now`
    fn is_fresh(&self, ttl: Duration, now: i64) -> bool {
        self.read()
            .map(|snapshot| snapshot.is_fresh_at(ttl, now))
            .unwrap_or(false)
    }
}

/// JSON file cache, one entry per file
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl Default for FileCacheStore {
    fn default() -> Self {
        Self::new(usage_cache_path())
    }
}

impl FileCacheStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_read(&self) -> Result<UsageSnapshot, StatusError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StatusError::CacheRead(format!("{:?}: {}", self.path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| StatusError::CacheRead(format!("{:?}: {}", self.path, e)))
    }

    fn try_write(&self, snapshot: &UsageSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_private_dir(parent)?;
        }

        let json = serde_json::to_string(snapshot).context("Failed to serialize usage snapshot")?;

        // Per-process temp name so concurrent renders never share one
        let temp_path = self
            .path
            .with_extension(format!("tmp.{}", std::process::id()));
        let _ = fs::remove_file(&temp_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp cache file: {:?}", temp_path))?;

        commit_temp(&mut file, json.as_bytes(), &temp_path, &self.path)
    }
}

/// Fill the open temp file and move it over `target`.
///
/// The temp file is removed whenever the cache was not replaced.
fn commit_temp(
    file: &mut impl Write,
    bytes: &[u8],
    temp_path: &Path,
    target: &Path,
) -> Result<()> {
    let result = file
        .write_all(bytes)
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write temp cache file: {:?}", temp_path))
        .and_then(|_| {
            fs::rename(temp_path, target)
                .with_context(|| format!("Failed to replace cache file: {:?}", target))
        });
    if result.is_err() {
        let _ = fs::remove_file(temp_path);
    }
    result
}

impl CacheStore for FileCacheStore {
    fn read(&self) -> Option<UsageSnapshot> {
        match self.try_read() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Usage cache miss: {}", e);
                None
            }
        }
    }

    fn write(&self, snapshot: &UsageSnapshot) -> Result<(), StatusError> {
        self.try_write(snapshot).map_err(StatusError::from)
    }
}
