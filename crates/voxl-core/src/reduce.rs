//! Full-volume reductions.
//!
//! These are the computations behind [`StatisticsCache`](crate::StatisticsCache):
//!
//! - [`min_max`] - Intensity range in one pass
//! - [`gradient_magnitude_max`] - Upper limit of the unsmoothed gradient magnitude
//! - [`histogram`] - Binned intensity distribution over a given range
//!
//! All of them walk every voxel once and run in parallel with rayon. They
//! are synchronous: a reduction, once started, runs to completion.

use rayon::prelude::*;
use tracing::trace;

use crate::channel::ScalarView;

/// Intensity range of a view.
///
/// Returns `(0.0, 0.0)` for an empty view.
pub fn min_max(view: &ScalarView<'_>) -> (f64, f64) {
    let n = view.len();
    trace!(voxels = n, "min_max");
    if n == 0 {
        return (0.0, 0.0);
    }
    (0..n)
        .into_par_iter()
        .fold(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), i| {
                let v = view.value_at(i);
                (lo.min(v), hi.max(v))
            },
        )
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |a, b| (a.0.min(b.0), a.1.max(b.1)),
        )
}

/// Maximum gradient magnitude over the volume.
///
/// The gradient is computed with central differences divided by the voxel
/// spacing, without smoothing. Out-of-volume neighbours are replaced by the
/// edge voxel (zero-flux Neumann boundary), so an axis of extent 1 contributes
/// no derivative. Returns `0.0` for an empty view.
pub fn gradient_magnitude_max(view: &ScalarView<'_>) -> f64 {
    let n = view.len();
    trace!(voxels = n, "gradient_magnitude_max");
    if n == 0 {
        return 0.0;
    }
    let volume = view.volume();
    let dims = volume.dims();
    let spacing = volume.spacing();
    let strides = [1, dims[0], dims[0] * dims[1]];

    (0..n)
        .into_par_iter()
        .map(|i| {
            let coord = volume.coordinate(i);
            let mut sum_sq = 0.0;
            for axis in 0..3 {
                if dims[axis] < 2 {
                    continue;
                }
                let c = coord[axis];
                let prev = if c > 0 { i - strides[axis] } else { i };
                let next = if c + 1 < dims[axis] { i + strides[axis] } else { i };
                let d = (view.value_at(next) - view.value_at(prev)) / (2.0 * spacing[axis]);
                sum_sq += d * d;
            }
            sum_sq.sqrt()
        })
        .reduce(|| 0.0, f64::max)
}

/// Binned intensity distribution.
///
/// Values are assigned to `bins` equal-width bins spanning `[lo, hi]`; the
/// maximum lands in the last bin. With a zero-width range every voxel goes to
/// bin 0.
pub fn histogram(view: &ScalarView<'_>, lo: f64, hi: f64, bins: usize) -> Vec<u64> {
    let bins = bins.max(1);
    let n = view.len();
    trace!(voxels = n, bins, "histogram");
    let span = hi - lo;
    let bin_of = move |v: f64| -> usize {
        if span <= 0.0 || !v.is_finite() {
            return 0;
        }
        let t = ((v - lo) / span).clamp(0.0, 1.0);
        ((t * bins as f64) as usize).min(bins - 1)
    };
    (0..n)
        .into_par_iter()
        .fold(
            || vec![0u64; bins],
            |mut counts, i| {
                counts[bin_of(view.value_at(i))] += 1;
                counts
            },
        )
        .reduce(
            || vec![0u64; bins],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SampleType, Volume};
    use approx::assert_relative_eq;

    #[test]
    fn test_min_max() {
        let vol = Volume::from_samples([3, 1, 1], vec![-4i16, 9, 2]).unwrap();
        assert_eq!(min_max(&ScalarView::scalar(&vol)), (-4.0, 9.0));

        let empty = Volume::empty(SampleType::U8);
        assert_eq!(min_max(&ScalarView::scalar(&empty)), (0.0, 0.0));
    }

    #[test]
    fn test_gradient_of_ramp() {
        // f(x) = 3x along x, constant along y and z.
        let data: Vec<f32> = (0..5 * 4 * 3).map(|i| 3.0 * (i % 5) as f32).collect();
        let vol = Volume::from_samples([5, 4, 3], data).unwrap();
        assert_relative_eq!(gradient_magnitude_max(&ScalarView::scalar(&vol)), 3.0);

        let vol = vol.with_spacing([0.5, 1.0, 1.0]).unwrap();
        assert_relative_eq!(gradient_magnitude_max(&ScalarView::scalar(&vol)), 6.0);
    }

    #[test]
    fn test_gradient_edge_replication() {
        // A single step between two voxels: each sees a one-sided difference / 2.
        let vol = Volume::from_samples([2, 1, 1], vec![0.0f64, 10.0]).unwrap();
        assert_relative_eq!(gradient_magnitude_max(&ScalarView::scalar(&vol)), 5.0);

        let flat = Volume::from_samples([1, 1, 1], vec![7u8]).unwrap();
        assert_eq!(gradient_magnitude_max(&ScalarView::scalar(&flat)), 0.0);
    }

    #[test]
    fn test_histogram_bins() {
        let vol = Volume::from_samples([5, 1, 1], vec![0u8, 1, 2, 3, 4]).unwrap();
        let h = histogram(&ScalarView::scalar(&vol), 0.0, 4.0, 2);
        assert_eq!(h, vec![2, 3]);
        assert_eq!(h.iter().sum::<u64>(), 5);

        let h = histogram(&ScalarView::scalar(&vol), 2.0, 2.0, 4);
        assert_eq!(h, vec![5, 0, 0, 0]);
    }
}
