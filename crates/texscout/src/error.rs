//! Error types for texscout

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A filename template that cannot be compiled.
///
/// Compilation errors are terminal for a discovery call: no scanning starts.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Template is empty")]
    Empty,

    #[error("Template is missing required placeholder {0}")]
    MissingPlaceholder(&'static str),

    #[error("Placeholder {0} appears more than once")]
    DuplicatePlaceholder(&'static str),

    #[error("Unknown placeholder: {0}")]
    UnknownPlaceholder(String),

    #[error("Extension marker must appear once, at the end of the template")]
    MisplacedExtension,

    #[error("Invalid separator: {0:?}")]
    InvalidSeparator(char),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Failure to read the scan root or one of its directories.
///
/// Scan errors are recoverable: they are collected in the scan report and the
/// walk yields an empty or partial result.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("Cannot read directory {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error at {path}: {message}")]
    Walk { path: String, message: String },
}

impl ScanError {
    pub(crate) fn from_walk(err: &walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ScanError::Walk {
            path,
            message: err.to_string(),
        }
    }
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Alias '{alias}' is claimed by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Error, Debug)]
pub enum TexScoutError {
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TexScoutError>;
