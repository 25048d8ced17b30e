//! Lazily computed per-image statistics.
//!
//! [`StatisticsCache`] holds the derived scalars a layer needs for display:
//! intensity range, display scale factor, gradient-magnitude upper limit and
//! an intensity histogram. Each field is computed on first read with a full
//! volume reduction and cached afterwards.
//!
//! # Invalidation
//!
//! Cached values belong to one `(version, channel)` key. Every accessor
//! compares the key of the view it is given and starts over on mismatch;
//! [`invalidate`](StatisticsCache::invalidate) clears everything explicitly.
//! There is no partial invalidation: any intensity change can alter both the
//! range and the gradient statistics.
//!
//! # Example
//!
//! ```rust
//! use voxl_core::{ScalarView, StatisticsCache, Volume};
//!
//! let vol = Volume::from_samples([4, 1, 1], vec![10u8, 20, 30, 40]).unwrap();
//! let view = ScalarView::scalar(&vol);
//! let mut cache = StatisticsCache::new();
//!
//! assert_eq!(cache.max(&view), 40.0);
//! assert_eq!(cache.min(&view), 10.0);
//! ```

use tracing::{debug, trace};

use crate::channel::{Channel, ScalarView};
use crate::native::NativeMapping;
use crate::reduce;

/// Observed intensity range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityRange {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl IntensityRange {
    /// Width of the range.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Whether all values are identical (or the image is empty).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    /// Maps a value to `[0, 1]`-relative position inside the range.
    ///
    /// Returns `0.0` for a degenerate range. Values outside the range are not
    /// clamped.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            0.0
        } else {
            (value - self.min) / span
        }
    }
}

/// Intensity histogram over the cached range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Range covered by the bins.
    pub range: IntensityRange,
    /// Voxel count per bin.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Number of bins.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Total number of voxels counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bin count (for plotting).
    pub fn peak(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Counts normalized by the largest bin.
    pub fn normalized(&self) -> Vec<f64> {
        let peak = self.peak();
        if peak == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / peak as f64)
            .collect()
    }
}

/// Cache key: buffer version plus displayed channel.
type CacheKey = (u64, Channel);

/// Lazily computed statistics for one image layer.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCache {
    key: Option<CacheKey>,
    range: Option<IntensityRange>,
    scale_factor: Option<f64>,
    gradient_upper_limit: Option<f64>,
    histogram: Option<Histogram>,
}

impl StatisticsCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every cached field.
    pub fn invalidate(&mut self) {
        trace!(key = ?self.key, "statistics invalidated");
        *self = Self::default();
    }

    /// Whether the intensity range is cached for this view.
    pub fn has_range(&self, view: &ScalarView<'_>) -> bool {
        self.key == Some(Self::key_of(view)) && self.range.is_some()
    }

    /// Whether the gradient limit is cached for this view.
    pub fn has_gradient_limit(&self, view: &ScalarView<'_>) -> bool {
        self.key == Some(Self::key_of(view)) && self.gradient_upper_limit.is_some()
    }

    fn key_of(view: &ScalarView<'_>) -> CacheKey {
        (view.version(), view.channel())
    }

    fn sync(&mut self, view: &ScalarView<'_>) {
        let key = Self::key_of(view);
        if self.key != Some(key) {
            if self.key.is_some() {
                self.invalidate();
            }
            self.key = Some(key);
        }
    }

    /// Intensity range, computed in one pass on first access.
    pub fn range(&mut self, view: &ScalarView<'_>) -> IntensityRange {
        self.sync(view);
        if let Some(range) = self.range {
            return range;
        }
        let (min, max) = reduce::min_max(view);
        let range = IntensityRange { min, max };
        debug!(voxels = view.len(), min, max, "computed intensity range");
        self.range = Some(range);
        range
    }

    /// Smallest value of the view.
    pub fn min(&mut self, view: &ScalarView<'_>) -> f64 {
        self.range(view).min
    }

    /// Largest value of the view.
    pub fn max(&mut self, view: &ScalarView<'_>) -> f64 {
        self.range(view).max
    }

    /// Ratio between the storage type's display span and the observed span.
    ///
    /// Maps stored values into a display range independent of the storage
    /// precision. `1.0` when the observed range is degenerate.
    pub fn scale_factor(&mut self, view: &ScalarView<'_>) -> f64 {
        self.sync(view);
        if let Some(s) = self.scale_factor {
            return s;
        }
        let range = self.range(view);
        let span = range.span();
        let factor = if span > 0.0 && span.is_finite() {
            view.volume().sample_type().display_span() / span
        } else {
            1.0
        };
        self.scale_factor = Some(factor);
        factor
    }

    /// Upper limit of the gradient magnitude in stored units.
    pub fn gradient_magnitude_upper_limit(&mut self, view: &ScalarView<'_>) -> f64 {
        self.sync(view);
        if let Some(g) = self.gradient_upper_limit {
            return g;
        }
        let g = reduce::gradient_magnitude_max(view);
        debug!(voxels = view.len(), limit = g, "computed gradient magnitude limit");
        self.gradient_upper_limit = Some(g);
        g
    }

    /// Upper limit of the gradient magnitude in native units.
    pub fn gradient_magnitude_upper_limit_native(
        &mut self,
        view: &ScalarView<'_>,
        mapping: &NativeMapping,
    ) -> f64 {
        self.gradient_magnitude_upper_limit(view) * mapping.scale_magnitude()
    }

    /// Histogram with `bins` bins over the intensity range.
    ///
    /// Recomputed when the requested bin count differs from the cached one.
    pub fn histogram(&mut self, view: &ScalarView<'_>, bins: usize) -> &Histogram {
        self.sync(view);
        let bins = bins.max(1);
        let range = self.range(view);
        let stale = self.histogram.as_ref().map_or(true, |h| h.bins() != bins);
        if stale {
            let counts = reduce::histogram(view, range.min, range.max, bins);
            debug!(voxels = view.len(), bins, "computed histogram");
            self.histogram = Some(Histogram { range, counts });
        }
        self.histogram.get_or_insert_with(|| Histogram {
            range,
            counts: vec![0; bins],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Representation, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn test_lazy_and_cached() {
        let vol = Volume::from_samples([3, 1, 1], vec![5u8, 1, 9]).unwrap();
        let view = ScalarView::scalar(&vol);
        let mut cache = StatisticsCache::new();
        assert!(!cache.has_range(&view));
        assert_eq!(cache.min(&view), 1.0);
        assert!(cache.has_range(&view));
        // Reading the range does not compute the gradient.
        assert!(!cache.has_gradient_limit(&view));
        assert_eq!(cache.max(&view), 9.0);
    }

    #[test]
    fn test_version_change_invalidates() {
        let mut vol = Volume::from_samples([2, 1, 1], vec![0u8, 4]).unwrap();
        let mut cache = StatisticsCache::new();
        assert_eq!(cache.max(&ScalarView::scalar(&vol)), 4.0);

        vol.set_sample([0, 0, 0], 0, 200.0).unwrap();
        let view = ScalarView::scalar(&vol);
        assert!(!cache.has_range(&view));
        assert_eq!(cache.max(&view), 200.0);
        assert_eq!(cache.min(&view), 4.0);
    }

    #[test]
    fn test_channel_change_invalidates() {
        let vol = Volume::new(
            [1, 1, 1],
            Representation::MultiComponent { count: 2 },
            vec![3.0f32, 4.0].into(),
        )
        .unwrap();
        let mut cache = StatisticsCache::new();
        let c0 = ScalarView::new(&vol, Channel::Component(0)).unwrap();
        assert_eq!(cache.max(&c0), 3.0);
        let mag = ScalarView::new(&vol, Channel::Magnitude).unwrap();
        assert_relative_eq!(cache.max(&mag), 5.0);
    }

    #[test]
    fn test_scale_factor() {
        let vol = Volume::from_samples([2, 1, 1], vec![0u8, 51]).unwrap();
        let mut cache = StatisticsCache::new();
        assert_relative_eq!(cache.scale_factor(&ScalarView::scalar(&vol)), 5.0);

        let vol = Volume::from_samples([2, 1, 1], vec![0.0f32, 4.0]).unwrap();
        assert_relative_eq!(cache.scale_factor(&ScalarView::scalar(&vol)), 0.25);

        let flat = Volume::from_samples([2, 1, 1], vec![7i16, 7]).unwrap();
        assert_eq!(cache.scale_factor(&ScalarView::scalar(&flat)), 1.0);
    }

    #[test]
    fn test_empty_volume() {
        let vol = Volume::empty(crate::SampleType::U16);
        let view = ScalarView::scalar(&vol);
        let mut cache = StatisticsCache::new();
        let range = cache.range(&view);
        assert_eq!((range.min, range.max), (0.0, 0.0));
        assert!(range.is_degenerate());
        assert_eq!(range.normalize(12.0), 0.0);
        assert_eq!(cache.gradient_magnitude_upper_limit(&view), 0.0);
        assert_eq!(cache.histogram(&view, 8).total(), 0);
    }

    #[test]
    fn test_native_gradient() {
        let vol = Volume::from_samples([3, 1, 1], vec![0i16, 2, 4]).unwrap();
        let view = ScalarView::scalar(&vol);
        let mut cache = StatisticsCache::new();
        let mapping = NativeMapping::new(-0.5, 100.0);
        assert_relative_eq!(cache.gradient_magnitude_upper_limit(&view), 2.0);
        assert_relative_eq!(
            cache.gradient_magnitude_upper_limit_native(&view, &mapping),
            1.0
        );
    }

    #[test]
    fn test_histogram_rebins() {
        let vol = Volume::from_samples([4, 1, 1], vec![0u8, 1, 2, 3]).unwrap();
        let view = ScalarView::scalar(&vol);
        let mut cache = StatisticsCache::new();
        assert_eq!(cache.histogram(&view, 2).counts, vec![2, 2]);
        assert_eq!(cache.histogram(&view, 4).bins(), 4);
        assert_eq!(cache.histogram(&view, 4).peak(), 1);
    }
}
