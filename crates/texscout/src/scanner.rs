//! Directory scanner
//!
//! Walks a root folder and yields a [`MatchRecord`] for every file whose
//! extension is allowed and whose name fits the compiled template.
//!
//! # Design
//!
//! - Single-threaded `walkdir` walk, pulled lazily through [`Scan`]
//! - Entries are sorted by file name at every level, so traversal order
//!   (and therefore which file wins a slot) is the same on every platform
//! - Unreadable roots and directories are recorded, never raised
//! - Symlinked files are scanned; symlinked directories only with `follow_symlinks`
//! - A [`ScanCancelToken`] is checked before each entry visit

use crate::cancel::ScanCancelToken;
use crate::error::ScanError;
use crate::scan_path::validate_scan_path;
use crate::template::{Matcher, TemplateMatch, TileId};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Normalize a relative path to use forward slashes on every platform.
fn normalize_path_to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Default image extensions accepted by the scanner
pub const DEFAULT_EXTENSIONS: &[&str] = &["exr", "png", "jpg"];

/// Default directory names skipped during the walk
pub const DEFAULT_EXCLUDE_DIR_NAMES: &[&str] = &[".git"];

/// Configuration for scanning operations
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Allowed file extensions, without the leading dot
    pub extensions: Vec<String>,
    /// Whether extension comparison is case-sensitive
    pub case_sensitive_extensions: bool,
    /// Whether to follow symlinks
    pub follow_symlinks: bool,
    /// Directory names to skip (matched against the name, not the full path)
    pub exclude_dir_names: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            case_sensitive_extensions: true,
            follow_symlinks: false,
            exclude_dir_names: DEFAULT_EXCLUDE_DIR_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A file that matched the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub object_name: Option<String>,
    pub texture_name: String,
    /// Raw type token as it appeared in the file name
    pub texture_type: String,
    pub tile_id: Option<TileId>,
    /// Original file name
    pub file_name: String,
    /// Parent directory relative to the scan root, forward slashes, empty at the root
    pub rel_dir: String,
}

impl MatchRecord {
    pub fn new(captures: TemplateMatch, file_name: impl Into<String>, rel_dir: impl Into<String>) -> Self {
        Self {
            object_name: captures.object_name,
            texture_name: captures.texture_name,
            texture_type: captures.texture_type,
            tile_id: captures.tile_id,
            file_name: file_name.into(),
            rel_dir: rel_dir.into(),
        }
    }

    /// Path of the file relative to the scan root.
    pub fn rel_path(&self) -> String {
        join_rel(&self.rel_dir, &self.file_name)
    }
}

pub(crate) fn join_rel(rel_dir: &str, file_name: &str) -> String {
    if rel_dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", rel_dir, file_name)
    }
}

/// Scan statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub dirs_scanned: u64,
    pub dirs_skipped: u64,
    pub files_seen: u64,
    /// Files rejected by the extension allowlist
    pub files_filtered: u64,
    /// Allowed files whose name did not fit the template
    pub files_unmatched: u64,
    pub files_matched: u64,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Final state of a finished (or abandoned) scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub stats: ScanStats,
    pub errors: Vec<ScanError>,
}

/// Filesystem scanner bound to one compiled template
pub struct Scanner<'m> {
    matcher: &'m Matcher,
    config: ScanConfig,
}

impl<'m> Scanner<'m> {
    /// Create a new scanner with the default config
    pub fn new(matcher: &'m Matcher) -> Self {
        Self::with_config(matcher, ScanConfig::default())
    }

    /// Create a new scanner with custom configuration
    pub fn with_config(matcher: &'m Matcher, mut config: ScanConfig) -> Self {
        for ext in &mut config.extensions {
            *ext = ext.trim().trim_start_matches('.').to_string();
        }
        Self { matcher, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Start a lazy scan of `root`.
    ///
    /// An unreadable root produces an empty scan whose report carries the error.
    pub fn scan(&self, root: &Path, cancel: &ScanCancelToken) -> Scan<'_> {
        info!(root = %root.display(), template = %self.matcher.template().source(), "Starting scan");

        let walker = match validate_scan_path(root) {
            Ok(()) => Some(
                WalkDir::new(root)
                    .follow_links(self.config.follow_symlinks)
                    .sort_by_file_name()
                    .into_iter(),
            ),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "Scan root unavailable");
                return Scan {
                    scanner: self,
                    root: root.to_path_buf(),
                    walker: None,
                    cancel: cancel.clone(),
                    started: Instant::now(),
                    report: ScanReport {
                        stats: ScanStats::default(),
                        errors: vec![err],
                    },
                };
            }
        };

        Scan {
            scanner: self,
            root: root.to_path_buf(),
            walker,
            cancel: cancel.clone(),
            started: Instant::now(),
            report: ScanReport::default(),
        }
    }

    fn extension_allowed(&self, file_name: &str) -> bool {
        let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.config.extensions.iter().any(|allowed| {
            if self.config.case_sensitive_extensions {
                allowed == ext
            } else {
                allowed.eq_ignore_ascii_case(ext)
            }
        })
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config.exclude_dir_names.iter().any(|n| *n == name)
    }
}

/// Lazy sequence of match records for one scan.
pub struct Scan<'s> {
    scanner: &'s Scanner<'s>,
    root: PathBuf,
    walker: Option<walkdir::IntoIter>,
    cancel: ScanCancelToken,
    started: Instant,
    report: ScanReport,
}

impl Scan<'_> {
    pub fn stats(&self) -> &ScanStats {
        &self.report.stats
    }

    pub fn errors(&self) -> &[ScanError] {
        &self.report.errors
    }

    /// Stop the walk and return the report.
    pub fn finish(mut self) -> ScanReport {
        self.report.stats.duration_ms = self.started.elapsed().as_millis() as u64;
        let stats = &self.report.stats;
        info!(
            root = %self.root.display(),
            dirs = stats.dirs_scanned,
            seen = stats.files_seen,
            filtered = stats.files_filtered,
            unmatched = stats.files_unmatched,
            matched = stats.files_matched,
            cancelled = stats.cancelled,
            errors = self.report.errors.len(),
            duration_ms = stats.duration_ms,
            "Scan complete"
        );
        self.report
    }

    fn visit(&mut self, entry: DirEntry) -> Option<MatchRecord> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if entry.depth() > 0 && self.scanner.is_excluded_dir(&entry) {
                debug!(path = %entry.path().display(), "Skipping excluded directory");
                if let Some(walker) = self.walker.as_mut() {
                    walker.skip_current_dir();
                }
                self.report.stats.dirs_skipped += 1;
            } else {
                self.report.stats.dirs_scanned += 1;
            }
            return None;
        }

        // Unfollowed links are kept when they resolve to a file; linked dirs are never entered
        if file_type.is_symlink() {
            if !entry.path().is_file() {
                trace!(path = %entry.path().display(), "Skipping symlink that is not a file");
                return None;
            }
        } else if !file_type.is_file() {
            return None;
        }

        let stats = &mut self.report.stats;
        stats.files_seen += 1;

        let Some(file_name) = entry.file_name().to_str() else {
            trace!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            stats.files_unmatched += 1;
            return None;
        };

        if !self.scanner.extension_allowed(file_name) {
            stats.files_filtered += 1;
            return None;
        }

        let Some(captures) = self.scanner.matcher.captures(file_name) else {
            trace!(file = file_name, "Name does not fit template");
            stats.files_unmatched += 1;
            return None;
        };
        stats.files_matched += 1;

        let rel_dir = entry
            .path()
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.root).ok())
            .map(normalize_path_to_forward_slashes)
            .unwrap_or_default();

        Some(MatchRecord::new(captures, file_name, rel_dir))
    }
}

impl Iterator for Scan<'_> {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<MatchRecord> {
        loop {
            if self.cancel.is_cancelled() {
                if !self.report.stats.cancelled {
                    self.report.stats.cancelled = true;
                    info!(root = %self.root.display(), "Scan cancelled");
                }
                self.walker = None;
                return None;
            }

            let entry = match self.walker.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let err = ScanError::from_walk(&err);
                    warn!(error = %err, "Directory entry could not be read");
                    self.report.errors.push(err);
                    continue;
                }
            };

            if let Some(record) = self.visit(entry) {
                return Some(record);
            }
        }
    }
}
