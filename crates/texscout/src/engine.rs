//! Discovery pipeline: compile the template, scan the root, aggregate matches.

use crate::aggregate::{AggregateStats, Aggregator};
use crate::cancel::ScanCancelToken;
use crate::config::TexScoutConfig;
use crate::error::{self, ConfigError, PatternError};
use crate::scan_path::{canonicalize_scan_path, expand_scan_path};
use crate::scanner::{ScanConfig, ScanReport, Scanner};
use crate::slots::SlotTable;
use crate::template::Template;
use crate::texture::TextureCatalog;
use std::path::Path;
use tracing::info;

/// Outcome of one discovery run.
///
/// Scan problems live in `scan.errors`; the catalog is empty or partial then.
#[derive(Debug)]
pub struct Discovery {
    pub textures: TextureCatalog,
    pub scan: ScanReport,
    pub aggregate: AggregateStats,
}

impl Discovery {
    pub fn is_complete(&self) -> bool {
        self.scan.errors.is_empty() && !self.scan.stats.cancelled
    }
}

/// Holds the immutable inputs shared by every scan: slot table and settings.
pub struct DiscoveryEngine {
    slots: SlotTable,
    scan_config: ScanConfig,
    separator: char,
    udim_marker: String,
}

impl DiscoveryEngine {
    pub fn new(config: &TexScoutConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            slots: config.slot_table()?,
            scan_config: config.scan_config(),
            separator: config.separator,
            udim_marker: config.udim_marker.clone(),
        })
    }

    /// Build an engine from a TOML config file.
    pub fn from_config_file(path: &Path) -> error::Result<Self> {
        let config = TexScoutConfig::load(path)?;
        Ok(Self::new(&config)?)
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// Run a fresh discovery over `root`.
    ///
    /// A template that fails to compile is returned as an error before any
    /// filesystem access.
    pub fn discover(
        &self,
        root: &Path,
        template: &str,
        cancel: &ScanCancelToken,
    ) -> Result<Discovery, PatternError> {
        let matcher = Template::parse_with_separator(template, self.separator)?.compile()?;
        let scanner = Scanner::with_config(&matcher, self.scan_config.clone());

        let mut aggregator = Aggregator::new(&self.slots).with_udim_marker(self.udim_marker.as_str());
        let mut scan = scanner.scan(root, cancel);
        aggregator.extend(scan.by_ref());
        let report = scan.finish();
        let (textures, aggregate) = aggregator.finish();

        info!(
            root = %root.display(),
            textures = textures.len(),
            assigned = aggregate.assigned,
            unresolved = aggregate.unresolved,
            overwritten = aggregate.overwritten,
            "Discovery complete"
        );

        Ok(Discovery {
            textures,
            scan: report,
            aggregate,
        })
    }

    /// Discover under a host-supplied root such as `$HIP/tex` or `~/assets`.
    pub fn discover_path(
        &self,
        raw_root: &str,
        template: &str,
        cancel: &ScanCancelToken,
    ) -> error::Result<Discovery> {
        let root = canonicalize_scan_path(&expand_scan_path(raw_root));
        Ok(self.discover(&root, template, cancel)?)
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        let config = TexScoutConfig::default();
        Self {
            slots: SlotTable::builtin().clone(),
            scan_config: config.scan_config(),
            separator: config.separator,
            udim_marker: config.udim_marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ScanError, TexScoutError};
    use crate::slots::Slot;
    use tempfile::TempDir;

    #[test]
    fn pattern_error_stops_before_scanning() {
        let engine = DiscoveryEngine::default();
        let result = engine.discover(
            Path::new("/definitely/not/here"),
            "@texName.ext",
            &ScanCancelToken::new(),
        );
        assert!(matches!(result, Err(PatternError::MissingPlaceholder("@texType"))));
    }

    #[test]
    fn missing_root_is_reported_not_raised() {
        let temp_dir = TempDir::new().unwrap();
        let engine = DiscoveryEngine::default();
        let discovery = engine
            .discover(
                &temp_dir.path().join("gone"),
                "@texName_@texType.ext",
                &ScanCancelToken::new(),
            )
            .unwrap();
        assert!(discovery.textures.is_empty());
        assert!(!discovery.is_complete());
        assert!(matches!(discovery.scan.errors[0], ScanError::RootNotFound(_)));
    }

    #[test]
    fn configured_aliases_and_separator_apply() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rock-diffuse.jpg"), b"").unwrap();

        let mut config = TexScoutConfig {
            separator: '-',
            ..Default::default()
        };
        config
            .aliases
            .insert("base_color".to_string(), vec!["diffuse".to_string()]);
        let engine = DiscoveryEngine::new(&config).unwrap();

        let discovery = engine
            .discover(temp_dir.path(), "@texName-@texType.ext", &ScanCancelToken::new())
            .unwrap();
        assert!(discovery.is_complete());
        assert_eq!(
            discovery.textures.get("rock").unwrap().get(Slot::BaseColor),
            Some("rock-diffuse.jpg")
        );
    }

    #[test]
    fn discover_path_resolves_relative_roots() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("tex")).unwrap();
        std::fs::write(temp_dir.path().join("tex/wall_normal.png"), b"").unwrap();

        let engine = DiscoveryEngine::default();
        let raw = format!("{}/tex/../tex", temp_dir.path().display());
        let discovery = engine
            .discover_path(&raw, "@texName_@texType.ext", &ScanCancelToken::new())
            .unwrap();
        assert_eq!(
            discovery.textures.get("wall").unwrap().get(Slot::Normal),
            Some("wall_normal.png")
        );

        let err = engine
            .discover_path(&raw, "@texName.ext", &ScanCancelToken::new())
            .unwrap_err();
        assert!(matches!(err, TexScoutError::Pattern(_)));
    }

    #[test]
    fn from_config_file_surfaces_config_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("texscout.toml");
        std::fs::write(&path, "[aliases]\nopacity = [\"albedo\"]\n").unwrap();

        let err = DiscoveryEngine::from_config_file(&path).err().unwrap();
        assert!(matches!(
            err,
            TexScoutError::Config(ConfigError::DuplicateAlias { .. })
        ));

        let missing = DiscoveryEngine::from_config_file(&temp_dir.path().join("none.toml"));
        assert!(matches!(missing, Err(TexScoutError::Config(ConfigError::Io(_)))));
    }
}
