//! Revision-keyed lookup table cache.
//!
//! Renderers sample the color map into a fixed-size table once and reuse it
//! until the map revision or the requested size changes.

use tracing::trace;

use crate::types::Rgba;
use crate::{ColorMap, ColorMapResult};

/// Cached `n`-entry sampling of a color map.
#[derive(Debug, Clone, Default)]
pub struct LutCache {
    key: Option<(u64, usize)>,
    table: Vec<Rgba>,
    rebuilds: u64,
}

impl LutCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `map` with `size` entries, resampled only when stale.
    pub fn get(&mut self, map: &ColorMap, size: usize) -> ColorMapResult<&[Rgba]> {
        let key = (map.revision(), size);
        if self.key != Some(key) {
            self.table = map.sample(size)?;
            self.key = Some(key);
            self.rebuilds += 1;
            trace!(revision = key.0, size, "lookup table rebuilt");
        }
        Ok(&self.table)
    }

    /// Whether a table for this revision and size is cached.
    pub fn is_current(&self, map: &ColorMap, size: usize) -> bool {
        self.key == Some((map.revision(), size))
    }

    /// Number of resamplings so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Drops the cached table.
    pub fn clear(&mut self) {
        self.key = None;
        self.table.clear();
    }
}
