//! Grouping of match records into texture sets.

use crate::scanner::{join_rel, MatchRecord};
use crate::slots::{Slot, SlotTable};
use crate::texture::TextureCatalog;
use tracing::debug;

/// Marker substituted for the tile number so per-tile files collapse into one path
pub const DEFAULT_UDIM_MARKER: &str = "<UDIM>";

/// Counters for one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub records: u64,
    pub assigned: u64,
    /// Records whose type token is not a known alias
    pub unresolved: u64,
    /// Assignments that replaced an earlier path for the same slot
    pub overwritten: u64,
}

/// Incremental aggregator; feed records in scan order, then [`finish`](Self::finish).
pub struct Aggregator<'t> {
    slots: &'t SlotTable,
    udim_marker: String,
    catalog: TextureCatalog,
    stats: AggregateStats,
}

impl<'t> Aggregator<'t> {
    pub fn new(slots: &'t SlotTable) -> Self {
        Self {
            slots,
            udim_marker: DEFAULT_UDIM_MARKER.to_string(),
            catalog: TextureCatalog::new(),
            stats: AggregateStats::default(),
        }
    }

    pub fn with_udim_marker(mut self, marker: impl Into<String>) -> Self {
        self.udim_marker = marker.into();
        self
    }

    /// Fold one record into the catalog, returning the slot it filled.
    pub fn push(&mut self, record: &MatchRecord) -> Option<Slot> {
        self.stats.records += 1;

        let name = entity_name(record);
        let texture = self.catalog.entry(&name);

        let Some(slot) = self.slots.resolve(&record.texture_type) else {
            self.stats.unresolved += 1;
            debug!(entity = %name, token = %record.texture_type, "Unrecognized texture type");
            return None;
        };

        let file_name = match &record.tile_id {
            Some(tile) if record.file_name.get(tile.span.clone()) == Some(tile.value.as_str()) => {
                let mut replaced = record.file_name.clone();
                replaced.replace_range(tile.span.clone(), &self.udim_marker);
                replaced
            }
            // Records built outside the scanner may carry a stale span; use the first occurrence
            Some(tile) => record.file_name.replacen(&tile.value, &self.udim_marker, 1),
            None => record.file_name.clone(),
        };
        let path = join_rel(&record.rel_dir, &file_name);

        if let Some(previous) = texture.set(slot, path) {
            if texture.get(slot) != Some(previous.as_str()) {
                self.stats.overwritten += 1;
                debug!(
                    entity = %name,
                    slot = %slot,
                    previous = %previous,
                    "Slot reassigned by later file"
                );
            }
        }
        self.stats.assigned += 1;
        Some(slot)
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn finish(self) -> (TextureCatalog, AggregateStats) {
        (self.catalog, self.stats)
    }
}

impl Extend<MatchRecord> for Aggregator<'_> {
    fn extend<I: IntoIterator<Item = MatchRecord>>(&mut self, records: I) {
        for record in records {
            self.push(&record);
        }
    }
}

/// Aggregate a whole record sequence with the default UDIM marker.
pub fn aggregate<I>(records: I, slots: &SlotTable) -> TextureCatalog
where
    I: IntoIterator<Item = MatchRecord>,
{
    let mut aggregator = Aggregator::new(slots);
    aggregator.extend(records);
    aggregator.finish().0
}

/// Grouping key: `object_texture`, or just the texture name.
pub fn entity_name(record: &MatchRecord) -> String {
    match &record.object_name {
        Some(object) => format!("{}_{}", object, record.texture_name),
        None => record.texture_name.clone(),
    }
}
