//! Scan root resolution and validation.
//!
//! Hosts hand over roots such as `$HIP/tex` or `~/assets`. The leading
//! symbolic segment is resolved here, before the scanner sees the path.

use crate::error::ScanError;
use std::path::{Path, PathBuf};

/// Expand a leading `~` or `$NAME` segment using the process environment.
pub fn expand_scan_path(raw: &str) -> PathBuf {
    expand_scan_path_with(raw, |name| std::env::var(name).ok())
}

/// Expand a leading `~` or `$NAME` segment with a caller-supplied lookup.
///
/// Unknown or unset variables leave the path unchanged.
pub fn expand_scan_path_with<F>(raw: &str, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let raw = raw.trim();
    let (head, tail) = match raw.split_once(['/', '\\']) {
        Some((head, tail)) => (head, Some(tail)),
        None => (raw, None),
    };

    let prefix = if head == "~" {
        dirs::home_dir().or_else(|| lookup("HOME").map(PathBuf::from))
    } else if let Some(name) = head.strip_prefix('$') {
        let name = name.trim_start_matches('{').trim_end_matches('}');
        if name.is_empty() {
            None
        } else {
            lookup(name).map(PathBuf::from)
        }
    } else {
        None
    };

    match (prefix, tail) {
        (Some(prefix), Some(tail)) if !tail.is_empty() => prefix.join(tail),
        (Some(prefix), _) => prefix,
        (None, _) => PathBuf::from(raw),
    }
}

pub fn canonicalize_scan_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Check that `path` is an existing, listable directory.
pub fn validate_scan_path(path: &Path) -> Result<(), ScanError> {
    if !path.exists() {
        return Err(ScanError::RootNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ScanError::RootNotDirectory(path.to_path_buf()));
    }
    if let Err(source) = std::fs::read_dir(path) {
        return Err(ScanError::RootUnreadable {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "HIP" => Some("/projects/shot010".to_string()),
            "JOB" => Some("/projects".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variables() {
        assert_eq!(
            expand_scan_path_with("$HIP/tex", fake_env),
            PathBuf::from("/projects/shot010/tex")
        );
        assert_eq!(
            expand_scan_path_with("$JOB/assets/wood", fake_env),
            PathBuf::from("/projects/assets/wood")
        );
        assert_eq!(
            expand_scan_path_with("${JOB}/assets", fake_env),
            PathBuf::from("/projects/assets")
        );
        assert_eq!(expand_scan_path_with("$HIP", fake_env), PathBuf::from("/projects/shot010"));
    }

    #[test]
    fn unknown_variables_and_plain_paths_are_untouched() {
        assert_eq!(expand_scan_path_with("$NOPE/tex", fake_env), PathBuf::from("$NOPE/tex"));
        assert_eq!(expand_scan_path_with("/abs/tex", fake_env), PathBuf::from("/abs/tex"));
        assert_eq!(expand_scan_path_with("rel/tex", fake_env), PathBuf::from("rel/tex"));
        assert_eq!(expand_scan_path_with("tex/$HIP", fake_env), PathBuf::from("tex/$HIP"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_scan_path_with("~/tex", fake_env), home.join("tex"));
        }
    }

    #[test]
    fn validate_reports_missing_and_file_roots() {
        let temp = TempDir::new().unwrap();
        assert!(validate_scan_path(temp.path()).is_ok());

        let missing = temp.path().join("missing");
        assert!(matches!(
            validate_scan_path(&missing),
            Err(ScanError::RootNotFound(p)) if p == missing
        ));

        let file = temp.path().join("wall_ao.png");
        std::fs::write(&file, b"").unwrap();
        assert!(matches!(
            validate_scan_path(&file),
            Err(ScanError::RootNotDirectory(_))
        ));
    }
}
