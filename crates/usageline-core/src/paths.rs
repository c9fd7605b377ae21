//! Filesystem locations shared across invocations.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the cached usage snapshot inside the state directory
const USAGE_CACHE_FILE: &str = "usage.json";

/// Get the base state directory, preferring XDG_RUNTIME_DIR for security
pub fn state_dir() -> PathBuf {
    match std::env::var("XDG_RUNTIME_DIR") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("usageline"),
        _ => {
            let uid = unsafe { libc::getuid() };
            PathBuf::from(format!("/tmp/usageline-{}", uid))
        }
    }
}

/// Default location of the usage snapshot cache
pub fn usage_cache_path() -> PathBuf {
    state_dir().join(USAGE_CACHE_FILE)
}

/// Create `dir` (and parents) if missing, restricting a fresh directory to 0700
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create state directory: {:?}", dir))?;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
        .with_context(|| format!("Failed to set permissions on state directory: {:?}", dir))?;
    Ok(())
}

/// Directory holding Claude Code's own config (credentials, projects)
pub fn claude_config_dir() -> Option<PathBuf> {
    match std::env::var("CLAUDE_CONFIG_DIR") {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| home.join(".claude")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_dir_default() {
        temp_env::with_var_unset("XDG_RUNTIME_DIR", || {
            let dir = state_dir();
            let uid = unsafe { libc::getuid() };
            assert_eq!(dir, PathBuf::from(format!("/tmp/usageline-{}", uid)));
        });
    }

    #[test]
    fn test_state_dir_with_xdg() {
        temp_env::with_var("XDG_RUNTIME_DIR", Some("/run/user/1000"), || {
            assert_eq!(state_dir(), PathBuf::from("/run/user/1000/usageline"));
            assert_eq!(
                usage_cache_path(),
                PathBuf::from("/run/user/1000/usageline/usage.json")
            );
        });
    }

    #[test]
    fn test_ensure_private_dir_sets_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        ensure_private_dir(&dir).unwrap();
        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        // Idempotent
        ensure_private_dir(&dir).unwrap();
    }

    #[test]
    fn test_claude_config_dir_override() {
        temp_env::with_var("CLAUDE_CONFIG_DIR", Some("/opt/claude"), || {
            assert_eq!(claude_config_dir(), Some(PathBuf::from("/opt/claude")));
        });
    }
}
