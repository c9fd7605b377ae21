//! Status payload piped on stdin by Claude Code for every prompt render.

use std::io::Read;

use serde::Deserialize;
use tracing::warn;

/// One invocation's JSON payload. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusInput {
    #[serde(default)]
    pub model: ModelInfo,
    #[serde(default)]
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub transcript_path: Option<String>,
    /// Older payloads carry the directory at top level
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Active model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Workspace directories
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default)]
    pub current_dir: Option<String>,
}

impl StatusInput {
    /// Parse a payload; malformed input degrades to an empty payload
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(input) => input,
            Err(e) => {
                warn!("Ignoring malformed status payload: {}", e);
                Self::default()
            }
        }
    }

    /// Read and parse the whole payload from `reader`
    pub fn from_reader(mut reader: impl Read) -> Self {
        let mut raw = String::new();
        if let Err(e) = reader.read_to_string(&mut raw) {
            warn!("Failed to read status payload: {}", e);
            return Self::default();
        }
        Self::parse(&raw)
    }

    /// Human label for the model: display name, then id, then a generic name
    pub fn model_label(&self) -> &str {
        self.model
            .display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| Some(self.model.id.as_str()).filter(|id| !id.trim().is_empty()))
            .unwrap_or("Claude")
    }

    /// Working directory of the session
    pub fn current_dir(&self) -> Option<&str> {
        self.workspace
            .current_dir
            .as_deref()
            .or(self.cwd.as_deref())
            .filter(|dir| !dir.is_empty())
    }

    /// Transcript path, empty when absent
    pub fn transcript(&self) -> &str {
        self.transcript_path.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let json = r#"{
            "session_id": "abc",
            "transcript_path": "/home/u/.claude/projects/x/abc.jsonl",
            "model": {"id": "claude-opus-4-1", "display_name": "Opus 4.1"},
            "workspace": {"current_dir": "/home/u/src/usageline", "project_dir": "/home/u/src"}
        }"#;
        let input = StatusInput::parse(json);
        assert_eq!(input.model.id, "claude-opus-4-1");
        assert_eq!(input.model_label(), "Opus 4.1");
        assert_eq!(input.current_dir(), Some("/home/u/src/usageline"));
        assert_eq!(input.transcript(), "/home/u/.claude/projects/x/abc.jsonl");
    }

    #[test]
    fn test_label_fallbacks() {
        let input = StatusInput::parse(r#"{"model": {"id": "claude-sonnet-4-5"}}"#);
        assert_eq!(input.model_label(), "claude-sonnet-4-5");

        let input = StatusInput::parse(r#"{"model": {"id": "", "display_name": " "}}"#);
        assert_eq!(input.model_label(), "Claude");
    }

    #[test]
    fn test_malformed_or_empty_is_default() {
        for raw in ["", "   \n", "{not json", "[]"] {
            let input = StatusInput::parse(raw);
            assert_eq!(input.model_label(), "Claude");
            assert_eq!(input.current_dir(), None);
            assert_eq!(input.transcript(), "");
        }
    }

    #[test]
    fn test_top_level_cwd_fallback() {
        let input = StatusInput::parse(r#"{"cwd": "/tmp/project"}"#);
        assert_eq!(input.current_dir(), Some("/tmp/project"));
    }

    #[test]
    fn test_from_reader() {
        let input = StatusInput::from_reader(r#"{"model":{"id":"m"}}"#.as_bytes());
        assert_eq!(input.model.id, "m");
    }
}
