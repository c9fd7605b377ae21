//! Bearer token lookup from Claude Code's credential store.
//!
//! On macOS the token lives in the login Keychain; everywhere else (and as
//! a macOS fallback) it lives in `~/.claude/.credentials.json`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::StatusError;
use crate::paths::claude_config_dir;

/// Something that can hand out a bearer token for the usage endpoint
pub trait CredentialSource {
    /// Resolve the token, or explain why there is none
    fn token(&self) -> Result<String, StatusError>;
}

/// Credentials JSON as written by Claude Code
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeCredentials {
    claude_ai_oauth: Option<OAuthCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthCredentials {
    access_token: Option<String>,
}

/// Extract `claudeAiOauth.accessToken` from a credentials document
pub fn parse_credentials_json(json: &str) -> Result<String, StatusError> {
    let creds: ClaudeCredentials = serde_json::from_str(json.trim())
        .map_err(|e| StatusError::no_credential(format!("malformed credentials: {}", e)))?;

    creds
        .claude_ai_oauth
        .and_then(|oauth| oauth.access_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| StatusError::no_credential("no OAuth access token in credentials"))
}

/// File-based credential store
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: Option<PathBuf>,
}

impl Default for FileCredentials {
    fn default() -> Self {
        Self {
            path: claude_config_dir().map(|dir| dir.join(".credentials.json")),
        }
    }
}

impl FileCredentials {
    /// Read credentials from an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn read(&self) -> Result<String> {
        let path = self
            .path
            .as_ref()
            .context("Could not determine home directory")?;
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {:?}", path))
    }
}

impl CredentialSource for FileCredentials {
    fn token(&self) -> Result<String, StatusError> {
        let content = self
            .read()
            .map_err(|e| StatusError::no_credential(format!("{:#}", e)))?;
        parse_credentials_json(&content)
    }
}

/// macOS Keychain entry written by Claude Code
#[cfg(target_os = "macos")]
#[derive(Debug, Clone, Default)]
pub struct KeychainCredentials;

#[cfg(target_os = "macos")]
impl KeychainCredentials {
    const SERVICE: &'static str = "Claude Code-credentials";

    fn read(&self) -> Result<String> {
        let output = std::process::Command::new("security")
            .args(["find-generic-password", "-s", Self::SERVICE, "-w"])
            .output()
            .context("Failed to execute security command")?;
        if !output.status.success() {
            anyhow::bail!("Keychain item not found");
        }
        String::from_utf8(output.stdout).context("Invalid UTF-8 in keychain data")
    }
}

#[cfg(target_os = "macos")]
impl CredentialSource for KeychainCredentials {
    fn token(&self) -> Result<String, StatusError> {
        let content = self
            .read()
            .map_err(|e| StatusError::no_credential(format!("{:#}", e)))?;
        parse_credentials_json(&content)
    }
}

/// Tries each source in order and returns the first token found
pub struct ChainedCredentials {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl ChainedCredentials {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }
}

impl CredentialSource for ChainedCredentials {
    fn token(&self) -> Result<String, StatusError> {
        let mut last = StatusError::no_credential("no credential sources configured");
        for source in &self.sources {
            match source.token() {
                Ok(token) => return Ok(token),
                Err(e) => {
                    tracing::debug!("Credential source skipped: {}", e);
                    last = e;
                }
            }
        }
        Err(last)
    }
}

/// Platform default: Keychain then file on macOS, file elsewhere
pub fn default_credentials() -> ChainedCredentials {
    #[cfg(target_os = "macos")]
    let sources: Vec<Box<dyn CredentialSource>> = vec![
        Box::new(KeychainCredentials),
        Box::new(FileCredentials::default()),
    ];
    #[cfg(not(target_os = "macos"))]
    let sources: Vec<Box<dyn CredentialSource>> = vec![Box::new(FileCredentials::default())];

    ChainedCredentials::new(sources)
}
