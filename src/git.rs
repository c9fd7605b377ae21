use std::process::Command;

/// Fetch the current branch name for a directory
///
/// Returns `None` outside a repository, when git is missing, or for an
/// empty directory string.
pub fn fetch_branch(dir: &str) -> Option<String> {
    if dir.is_empty() {
        return None;
    }
    let output = Command::new("git")
        .args(["-C", dir, "rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if branch.is_empty() {
        None
    } else {
        Some(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dir_has_no_branch() {
        assert_eq!(fetch_branch(""), None);
    }

    #[test]
    fn test_non_repo_has_no_branch() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(fetch_branch(&dir.path().to_string_lossy()), None);
    }

    #[test]
    fn test_missing_dir_has_no_branch() {
        assert_eq!(fetch_branch("/nonexistent/usageline/dir"), None);
    }
}
