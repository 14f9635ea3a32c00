//! Texscout - Texture Set Discovery
//!
//! Texscout turns a folder of texture maps into texture set entities. A user
//! template such as `@objName_@texName_@texType.@id.ext` describes how file
//! names are built; every matching file is classified into a canonical slot
//! (base color, roughness, normal, ...) and grouped under its asset name.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌─────────┐     ┌────────────┐     ┌─────────────┐     ┌────────────────┐
//! │  Template  │────▶│ Matcher │────▶│  Scanner   │────▶│ Aggregator  │────▶│ TextureCatalog │
//! │  (string)  │     │ (regex) │     │ (walkdir)  │     │ (SlotTable) │     │                │
//! └────────────┘     └─────────┘     └────────────┘     └─────────────┘     └────────────────┘
//! ```
//!
//! Every scan is a fresh computation; nothing is cached between runs.

pub mod aggregate;
pub mod backend;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod scan_path;
pub mod scanner;
pub mod slots;
pub mod template;
pub mod texture;

// Re-exports for convenience
pub use aggregate::{aggregate, AggregateStats, Aggregator, DEFAULT_UDIM_MARKER};
pub use backend::{materialize, MaterialBackend};
pub use cancel::ScanCancelToken;
pub use config::TexScoutConfig;
pub use engine::{Discovery, DiscoveryEngine};
pub use error::{ConfigError, PatternError, Result, ScanError, TexScoutError};
pub use scan_path::{
    canonicalize_scan_path, expand_scan_path, expand_scan_path_with, validate_scan_path,
};
pub use scanner::{MatchRecord, Scan, ScanConfig, ScanReport, ScanStats, Scanner};
pub use slots::{Slot, SlotInfo, SlotTable};
pub use template::{compile, Matcher, Placeholder, Segment, Template, TemplateMatch, TileId};
pub use texture::{Texture, TextureCatalog};
