//! Canonical texture slots and the alias table that classifies raw tokens.
//!
//! A file named `wall_albedo.png` carries the raw type token `albedo`; the
//! [`SlotTable`] resolves it to [`Slot::BaseColor`]. Lookup is exact and
//! case-insensitive on the whole token.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A canonical semantic texture role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    BaseColor,
    Metalness,
    SpecularRoughness,
    Normal,
    Displacement,
    AmbientOcclusion,
    Transmission,
    Opacity,
}

impl Slot {
    pub const COUNT: usize = 8;

    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::BaseColor,
        Slot::Metalness,
        Slot::SpecularRoughness,
        Slot::Normal,
        Slot::Displacement,
        Slot::AmbientOcclusion,
        Slot::Transmission,
        Slot::Opacity,
    ];

    /// Position of this slot in fixed-size per-slot storage.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseColor => "base_color",
            Self::Metalness => "metalness",
            Self::SpecularRoughness => "specular_roughness",
            Self::Normal => "normal",
            Self::Displacement => "displacement",
            Self::AmbientOcclusion => "ambient_occlusion",
            Self::Transmission => "transmission",
            Self::Opacity => "opacity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|slot| slot.as_str() == lower)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata and recognized aliases for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub slot: Slot,
    /// Human-readable label, e.g. "Base Color"
    pub label: &'static str,
    /// Short suffix used when naming nodes, e.g. "BC"
    pub abbreviation: &'static str,
    /// Lowercase raw tokens that resolve to this slot
    pub aliases: Vec<String>,
}

impl SlotInfo {
    fn builtin(
        slot: Slot,
        label: &'static str,
        abbreviation: &'static str,
        aliases: &[&str],
    ) -> Self {
        Self {
            slot,
            label,
            abbreviation,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

fn builtin_entries() -> Vec<SlotInfo> {
    vec![
        SlotInfo::builtin(Slot::BaseColor, "Base Color", "BC", &["basecolor", "base", "albedo"]),
        SlotInfo::builtin(Slot::Metalness, "Metalness", "M", &["metalness", "metallic"]),
        SlotInfo::builtin(Slot::SpecularRoughness, "Specular Rough", "SR", &["roughness", "specular"]),
        SlotInfo::builtin(Slot::Normal, "Normal", "N", &["normal"]),
        SlotInfo::builtin(Slot::Displacement, "Displacement", "D", &["height", "displacement"]),
        SlotInfo::builtin(
            Slot::AmbientOcclusion,
            "Ambient Occlusion",
            "AO",
            &["ao", "ambientocclusion", "ambientoclussion"],
        ),
        SlotInfo::builtin(Slot::Transmission, "Transmission", "T", &["transmission", "transmision"]),
        SlotInfo::builtin(Slot::Opacity, "Opacity", "O", &["opacity"]),
    ]
}

static BUILTIN: LazyLock<SlotTable> = LazyLock::new(|| {
    SlotTable::new(builtin_entries()).expect("builtin slot aliases are unique")
});

/// Immutable registry of slots and their aliases.
///
/// Built once and passed by reference; extending it produces a new table.
#[derive(Debug, Clone)]
pub struct SlotTable {
    entries: Vec<SlotInfo>,
    by_alias: HashMap<String, Slot>,
}

impl SlotTable {
    /// Build a table, rejecting any alias claimed by two slots.
    pub fn new(entries: Vec<SlotInfo>) -> Result<Self, ConfigError> {
        let mut by_alias: HashMap<String, Slot> = HashMap::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            let mut aliases = Vec::with_capacity(entry.aliases.len());
            for alias in &entry.aliases {
                let alias = alias.trim().to_lowercase();
                if alias.is_empty() {
                    continue;
                }
                match by_alias.get(&alias) {
                    Some(owner) if *owner == entry.slot => continue,
                    Some(owner) => {
                        return Err(ConfigError::DuplicateAlias {
                            alias,
                            first: owner.as_str(),
                            second: entry.slot.as_str(),
                        });
                    }
                    None => {
                        by_alias.insert(alias.clone(), entry.slot);
                        aliases.push(alias);
                    }
                }
            }
            entry.aliases = aliases;
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
            by_alias,
        })
    }

    /// The process-wide default table.
    pub fn builtin() -> &'static SlotTable {
        &BUILTIN
    }

    /// Copy of this table with additional aliases appended to their slots.
    pub fn with_extra_aliases<I, S>(&self, extra: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Slot, S)>,
        S: Into<String>,
    {
        let mut entries = self.entries.clone();
        for (slot, alias) in extra {
            let alias = alias.into();
            match entries.iter_mut().find(|e| e.slot == slot) {
                Some(entry) => entry.aliases.push(alias),
                None => return Err(ConfigError::UnknownSlot(slot.as_str().to_string())),
            }
        }
        Self::new(entries)
    }

    /// Resolve a raw type token to its slot.
    pub fn resolve(&self, token: &str) -> Option<Slot> {
        self.by_alias.get(&token.to_lowercase()).copied()
    }

    /// Resolve a display label ("Base Color") to its slot.
    pub fn resolve_label(&self, label: &str) -> Option<Slot> {
        self.entries
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(label.trim()))
            .map(|e| e.slot)
    }

    pub fn info(&self, slot: Slot) -> Option<&SlotInfo> {
        self.entries.iter().find(|e| e.slot == slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotInfo> {
        self.entries.iter()
    }
}
