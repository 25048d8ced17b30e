//! Color map shared between an editing thread and render threads.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use crate::types::Rgba;
use crate::ColorMap;

/// Single-writer, many-reader handle to a [`ColorMap`].
///
/// Readers evaluate and read the revision under one read lock, so a
/// snapshot never mixes two map states. Writers hold the write lock for the
/// whole mutation.
#[derive(Debug, Clone, Default)]
pub struct SharedColorMap {
    inner: Arc<RwLock<ColorMap>>,
}

impl SharedColorMap {
    /// Wraps a map.
    pub fn new(map: ColorMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Read access to the committed map.
    pub fn read(&self) -> RwLockReadGuard<'_, ColorMap> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        self.read().revision()
    }

    /// Revision and color at `t`, taken together.
    pub fn snapshot(&self, t: f64) -> (u64, Rgba) {
        let map = self.read();
        (map.revision(), map.evaluate(t))
    }

    /// Applies a mutation under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ColorMap) -> R) -> R {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut map)
    }

    /// Copy of the committed map.
    pub fn to_map(&self) -> ColorMap {
        self.read().clone()
    }
}
