//! Configuration for texscout

use crate::aggregate::DEFAULT_UDIM_MARKER;
use crate::error::ConfigError;
use crate::scanner::{ScanConfig, DEFAULT_EXCLUDE_DIR_NAMES, DEFAULT_EXTENSIONS};
use crate::slots::{Slot, SlotTable};
use crate::template::DEFAULT_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexScoutConfig {
    /// Image extensions to consider, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_case_sensitive_extensions")]
    pub case_sensitive_extensions: bool,

    /// Separator that wildcards and name captures never cross
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Replacement for tile numbers in stored paths
    #[serde(default = "default_udim_marker")]
    pub udim_marker: String,

    #[serde(default)]
    pub follow_symlinks: bool,

    #[serde(default = "default_exclude_dir_names")]
    pub exclude_dir_names: Vec<String>,

    /// Extra aliases keyed by slot name, e.g. `base_color = ["diffuse"]`
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_case_sensitive_extensions() -> bool {
    true
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

fn default_udim_marker() -> String {
    DEFAULT_UDIM_MARKER.to_string()
}

fn default_exclude_dir_names() -> Vec<String> {
    DEFAULT_EXCLUDE_DIR_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for TexScoutConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            case_sensitive_extensions: default_case_sensitive_extensions(),
            separator: default_separator(),
            udim_marker: default_udim_marker(),
            follow_symlinks: false,
            exclude_dir_names: default_exclude_dir_names(),
            aliases: BTreeMap::new(),
        }
    }
}

impl TexScoutConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Builtin slot table extended with the configured aliases.
    pub fn slot_table(&self) -> Result<SlotTable, ConfigError> {
        let mut extra = Vec::new();
        for (name, aliases) in &self.aliases {
            let slot = Slot::parse(name).ok_or_else(|| ConfigError::UnknownSlot(name.clone()))?;
            extra.extend(aliases.iter().map(|alias| (slot, alias.clone())));
        }
        SlotTable::builtin().with_extra_aliases(extra)
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            extensions: self.extensions.clone(),
            case_sensitive_extensions: self.case_sensitive_extensions,
            follow_symlinks: self.follow_symlinks,
            exclude_dir_names: self.exclude_dir_names.clone(),
        }
    }
}
