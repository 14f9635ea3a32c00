//! Texture set entities produced by aggregation.

use crate::slots::Slot;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One logical texture set: an entity name and at most one relative path per slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: String,
    slots: [Option<String>; Slot::COUNT],
}

impl Texture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots[slot.index()].as_deref()
    }

    /// Assign a path to a slot, returning the value it replaced.
    pub fn set(&mut self, slot: Slot, rel_path: impl Into<String>) -> Option<String> {
        self.slots[slot.index()].replace(rel_path.into())
    }

    pub fn clear(&mut self, slot: Slot) -> Option<String> {
        self.slots[slot.index()].take()
    }

    /// Assigned slots in canonical slot order.
    pub fn assigned(&self) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|path| (slot, path)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Absolute location of a slot's file under the scan root.
    pub fn full_path(&self, slot: Slot, root: &Path) -> Option<PathBuf> {
        self.get(slot).map(|rel| root.join(rel))
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for slot in Slot::ALL {
            writeln!(f, "  {}: {}", slot, self.get(slot).unwrap_or("-"))?;
        }
        Ok(())
    }
}

struct AssignedSlots<'a>(&'a Texture);

impl Serialize for AssignedSlots<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (slot, path) in self.0.assigned() {
            map.serialize_entry(slot.as_str(), path)?;
        }
        map.end()
    }
}

impl Serialize for Texture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Texture", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("slots", &AssignedSlots(self))?;
        state.end()
    }
}

/// The result of one aggregation run, keyed and ordered by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextureCatalog {
    textures: BTreeMap<String, Texture>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Texture> {
        self.textures.get_mut(name)
    }

    /// Fetch the entity for `name`, creating it with empty slots if absent.
    pub fn entry(&mut self, name: &str) -> &mut Texture {
        self.textures
            .entry(name.to_string())
            .or_insert_with(|| Texture::new(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn into_textures(self) -> Vec<Texture> {
        self.textures.into_values().collect()
    }
}

impl IntoIterator for TextureCatalog {
    type Item = Texture;
    type IntoIter = std::collections::btree_map::IntoValues<String, Texture>;

    fn into_iter(self) -> Self::IntoIter {
        self.textures.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_texture_has_no_slots() {
        let texture = Texture::new("wall");
        assert_eq!(texture.name(), "wall");
        assert!(texture.is_empty());
        for slot in Slot::ALL {
            assert_eq!(texture.get(slot), None);
        }
    }

    #[test]
    fn set_overwrites_and_returns_previous() {
        let mut texture = Texture::new("wall");
        assert_eq!(texture.set(Slot::Normal, "a.png"), None);
        assert_eq!(texture.set(Slot::Normal, "b.png"), Some("a.png".to_string()));
        assert_eq!(texture.get(Slot::Normal), Some("b.png"));
        assert_eq!(texture.clear(Slot::Normal), Some("b.png".to_string()));
        assert!(texture.is_empty());
    }

    #[test]
    fn assigned_follows_slot_order() {
        let mut texture = Texture::new("wall");
        texture.set(Slot::Opacity, "o.png");
        texture.set(Slot::BaseColor, "bc.png");
        let assigned: Vec<_> = texture.assigned().collect();
        assert_eq!(
            assigned,
            vec![(Slot::BaseColor, "bc.png"), (Slot::Opacity, "o.png")]
        );
    }

    #[test]
    fn full_path_joins_root() {
        let mut texture = Texture::new("wall");
        texture.set(Slot::Displacement, "maps/wall_height.exr");
        assert_eq!(
            texture.full_path(Slot::Displacement, Path::new("/assets")),
            Some(PathBuf::from("/assets/maps/wall_height.exr"))
        );
        assert_eq!(texture.full_path(Slot::Normal, Path::new("/assets")), None);
    }

    #[test]
    fn display_lists_every_slot() {
        let mut texture = Texture::new("wall");
        texture.set(Slot::Metalness, "wall_metal.png");
        let text = texture.to_string();
        assert!(text.starts_with("wall\n"));
        assert!(text.contains("  metalness: wall_metal.png"));
        assert!(text.contains("  normal: -"));
    }

    #[test]
    fn catalog_entry_creates_once() {
        let mut catalog = TextureCatalog::new();
        catalog.entry("wall").set(Slot::BaseColor, "a.png");
        catalog.entry("wall").set(Slot::Normal, "b.png");
        catalog.entry("floor");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["floor", "wall"]);
        assert_eq!(catalog.get("wall").unwrap().assigned().count(), 2);
    }

    #[test]
    fn catalog_edits_and_drains_in_name_order() {
        let mut catalog = TextureCatalog::new();
        catalog.entry("wall").set(Slot::BaseColor, "wall_albedo.png");
        catalog.entry("brick").set(Slot::Normal, "brick_normal.png");

        catalog.get_mut("wall").unwrap().clear(Slot::BaseColor);
        assert!(catalog.get_mut("missing").is_none());
        assert!(catalog.contains("brick"));

        let textures = catalog.into_textures();
        let names: Vec<_> = textures.iter().map(Texture::name).collect();
        assert_eq!(names, vec!["brick", "wall"]);
        assert!(textures[1].is_empty());
    }
}
