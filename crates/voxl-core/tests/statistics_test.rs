//! Statistics cache behavior against changing images.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxl_core::{
    Channel, ImageSource, NativeMapping, Representation, SampleBuffer, ScalarView,
    StatisticsCache, Volume,
};

fn noise(len: usize, seed: u64) -> Vec<i16> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-2000..=2000)).collect()
}

fn expected_range(data: &[i16]) -> (f64, f64) {
    let min = data.iter().copied().min().unwrap_or(0) as f64;
    let max = data.iter().copied().max().unwrap_or(0) as f64;
    (min, max)
}

#[test]
fn test_access_order_does_not_matter() {
    for seed in 1..6 {
        let data = noise(8 * 7 * 5, seed);
        let (lo, hi) = expected_range(&data);
        let vol = Volume::from_samples([8, 7, 5], data).unwrap();
        let view = ScalarView::scalar(&vol);

        let mut a = StatisticsCache::new();
        a.invalidate();
        let (max_a, min_a) = (a.max(&view), a.min(&view));

        let mut b = StatisticsCache::new();
        b.invalidate();
        let (min_b, max_b) = (b.min(&view), b.max(&view));

        assert_eq!((min_a, max_a), (lo, hi));
        assert_eq!((min_b, max_b), (lo, hi));
    }
}

#[test]
fn test_stale_cache_follows_new_buffer() {
    let first = noise(64, 7);
    let second = noise(64, 99);
    let mut source = ImageSource::new(
        Volume::from_samples([4, 4, 4], first.clone()).unwrap(),
        NativeMapping::identity(),
    );
    let mut stats = StatisticsCache::new();
    let r1 = stats.range(&ScalarView::scalar(source.volume()));
    assert_eq!((r1.min, r1.max), expected_range(&first));

    source.replace(
        Volume::from_samples([4, 4, 4], second.clone()).unwrap(),
        NativeMapping::new(2.0, 1.0),
    );
    let view = ScalarView::scalar(source.volume());
    assert!(!stats.has_range(&view));
    let max = stats.max(&view);
    let min = stats.min(&view);
    assert_eq!((min, max), expected_range(&second));
}

#[test]
fn test_in_place_edit_invalidates() {
    let mut source = ImageSource::new(
        Volume::from_samples([2, 2, 2], vec![1.0f32; 8]).unwrap(),
        NativeMapping::identity(),
    );
    let mut stats = StatisticsCache::new();
    assert_eq!(stats.max(&ScalarView::scalar(source.volume())), 1.0);

    source.set_sample([1, 1, 1], 0, 9.5).unwrap();
    assert_eq!(stats.max(&ScalarView::scalar(source.volume())), 9.5);
    assert_eq!(stats.min(&ScalarView::scalar(source.volume())), 1.0);
}

#[test]
fn test_ramp_gradient_limit() {
    // f(x) = 4x along x, constant in y and z
    let data: Vec<f32> = (0..6 * 3 * 2).map(|i| 4.0 * (i % 6) as f32).collect();
    let vol = Volume::from_samples([6, 3, 2], data)
        .unwrap()
        .with_spacing([2.0, 1.0, 1.0])
        .unwrap();
    let view = ScalarView::scalar(&vol);
    let mut stats = StatisticsCache::new();
    assert_relative_eq!(stats.gradient_magnitude_upper_limit(&view), 2.0, epsilon = 1e-12);

    let mapping = NativeMapping::new(-3.0, 100.0);
    assert_relative_eq!(
        stats.gradient_magnitude_upper_limit_native(&view, &mapping),
        6.0,
        epsilon = 1e-12
    );
    assert!(stats.has_gradient_limit(&view));
}

#[test]
fn test_channel_switch_recomputes() {
    let buffer = SampleBuffer::from(vec![3.0f64, 4.0, 0.0, 1.0]);
    let vol = Volume::new([2, 1, 1], Representation::with_components(2).unwrap(), buffer).unwrap();
    let mut stats = StatisticsCache::new();

    let c0 = ScalarView::new(&vol, Channel::Component(0)).unwrap();
    assert_eq!((stats.min(&c0), stats.max(&c0)), (0.0, 3.0));

    let mag = ScalarView::new(&vol, Channel::Magnitude).unwrap();
    assert!(!stats.has_range(&mag));
    assert_relative_eq!(stats.max(&mag), 5.0);
    assert_relative_eq!(stats.min(&mag), 1.0);
}

#[test]
fn test_empty_image_conventions() {
    let vol = Volume::empty(voxl_core::SampleType::U8);
    let view = ScalarView::scalar(&vol);
    let mut stats = StatisticsCache::new();
    assert_eq!((stats.min(&view), stats.max(&view)), (0.0, 0.0));
    assert_eq!(stats.gradient_magnitude_upper_limit(&view), 0.0);
    assert_eq!(stats.scale_factor(&view), 1.0);
}

#[test]
fn test_scale_factor_uses_storage_span() {
    let vol = Volume::from_samples([3, 1, 1], vec![10u8, 20, 61]).unwrap();
    let mut stats = StatisticsCache::new();
    assert_relative_eq!(stats.scale_factor(&ScalarView::scalar(&vol)), 255.0 / 51.0);

    let flat = Volume::from_samples([3, 1, 1], vec![0.25f32; 3]).unwrap();
    assert_eq!(stats.scale_factor(&ScalarView::scalar(&flat)), 1.0);
}
