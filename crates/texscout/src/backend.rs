//! Hand-off to renderer-specific material builders.
//!
//! The core never builds shader networks itself. A renderer integration
//! implements [`MaterialBackend`] and receives finished [`Texture`]s.

use crate::texture::{Texture, TextureCatalog};
use std::path::Path;
use tracing::debug;

/// Builds a renderer material from one texture set.
pub trait MaterialBackend {
    type Output;
    type Error;

    /// `root` is the scan root the texture's relative paths are based on.
    fn build(&mut self, texture: &Texture, root: &Path) -> Result<Self::Output, Self::Error>;
}

/// Build every selected texture in catalog order.
///
/// Names missing from the catalog are skipped. Stops at the first backend error.
pub fn materialize<B, S>(
    catalog: &TextureCatalog,
    selection: &[S],
    root: &Path,
    backend: &mut B,
) -> Result<Vec<B::Output>, B::Error>
where
    B: MaterialBackend,
    S: AsRef<str>,
{
    let mut outputs = Vec::new();
    for texture in catalog.iter() {
        if !selection.iter().any(|s| s.as_ref() == texture.name()) {
            continue;
        }
        debug!(texture = %texture.name(), "Building material");
        outputs.push(backend.build(texture, root)?);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::Slot;
    use std::path::PathBuf;

    /// Records the file nodes a renderer would create.
    #[derive(Default)]
    struct RecordingBackend {
        fail_on: Option<&'static str>,
    }

    impl MaterialBackend for RecordingBackend {
        type Output = (String, Vec<PathBuf>);
        type Error = String;

        fn build(&mut self, texture: &Texture, root: &Path) -> Result<Self::Output, String> {
            if self.fail_on == Some(texture.name()) {
                return Err(format!("cannot build {}", texture.name()));
            }
            let files = texture
                .assigned()
                .filter_map(|(slot, _)| texture.full_path(slot, root))
                .collect();
            Ok((texture.name().to_string(), files))
        }
    }

    fn catalog() -> TextureCatalog {
        let mut catalog = TextureCatalog::new();
        catalog.entry("wall").set(Slot::BaseColor, "wall_basecolor.png");
        catalog.entry("floor").set(Slot::Normal, "maps/floor_normal.exr");
        catalog.entry("roof");
        catalog
    }

    #[test]
    fn builds_only_selected_in_catalog_order() {
        let mut backend = RecordingBackend::default();
        let outputs = materialize(
            &catalog(),
            &["wall", "floor", "missing"],
            Path::new("/tex"),
            &mut backend,
        )
        .unwrap();

        assert_eq!(
            outputs,
            vec![
                ("floor".to_string(), vec![PathBuf::from("/tex/maps/floor_normal.exr")]),
                ("wall".to_string(), vec![PathBuf::from("/tex/wall_basecolor.png")]),
            ]
        );
    }

    #[test]
    fn stops_at_first_error() {
        let mut backend = RecordingBackend {
            fail_on: Some("floor"),
        };
        let result = materialize(&catalog(), &["floor", "wall"], Path::new("/tex"), &mut backend);
        assert_eq!(result.unwrap_err(), "cannot build floor");
    }
}
