//! The image layer facade.
//!
//! An [`ImageLayer`] combines the shared image slot, its statistics cache,
//! the layer's color map and the color map editor. Rendering asks it for the
//! display color and native value of a voxel; the editor UI drives the color
//! map through [`ImageLayer::editor_and_map`].
//!
//! The layer subscribes to the image's change notifications on creation. The
//! callback only raises a flag; the next query sees the flag and drops every
//! cached statistic. The subscription is released when the layer is dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLockReadGuard};

use tracing::{debug, warn};
use voxl_colormap::{ColorMap, ColorMapEditController, ColorMapPreset, LutCache, Rgba};
use voxl_core::{
    Channel, Histogram, ImageEvent, ImageSource, IntensityRange, ScalarView, SharedImage,
    StatisticsCache, Subscription, VoxelIndex,
};

use crate::{LayerConfig, LayerResult};

fn read_image(image: &SharedImage) -> RwLockReadGuard<'_, ImageSource> {
    image.read().unwrap_or_else(PoisonError::into_inner)
}

/// Everything shown in the voxel readout of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelReadout {
    /// Voxel coordinate.
    pub voxel: VoxelIndex,
    /// Displayed channel value as stored.
    pub stored: f64,
    /// Displayed channel value in native units.
    pub native: f64,
    /// Every component in native units.
    pub components: Vec<f64>,
    /// Display color.
    pub color: Rgba,
}

impl fmt::Display for VoxelReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.voxel;
        write!(f, "({x}, {y}, {z}): {}", self.native)?;
        if self.components.len() > 1 {
            let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
            write!(f, " [{}]", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Display pipeline of one image layer.
pub struct ImageLayer {
    image: SharedImage,
    stale: Arc<AtomicBool>,
    _subscription: Subscription,
    stats: StatisticsCache,
    channel: Channel,
    color_map: ColorMap,
    editor: ColorMapEditController,
    lut: LutCache,
    config: LayerConfig,
}

impl fmt::Debug for ImageLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLayer")
            .field("channel", &self.channel)
            .field("revision", &self.color_map.revision())
            .field("stale", &self.stale.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl ImageLayer {
    /// Creates a layer over `image`, starting with the configured preset.
    pub fn new(image: SharedImage, config: &LayerConfig) -> LayerResult<Self> {
        config.validate()?;
        let preset = config.preset()?;
        let stale = Arc::new(AtomicBool::new(false));
        let subscription = {
            let flag = Arc::clone(&stale);
            read_image(&image).subscribe(move |event: &ImageEvent| {
                if !matches!(event, ImageEvent::NativeMappingChanged) {
                    flag.store(true, Ordering::Release);
                }
            })
        };
        debug!(%preset, "image layer created");
        Ok(Self {
            image,
            stale,
            _subscription: subscription,
            stats: StatisticsCache::new(),
            channel: Channel::default(),
            color_map: preset.build(),
            editor: ColorMapEditController::new(config.hit_radius),
            lut: LutCache::new(),
            config: config.clone(),
        })
    }

    /// The shared image slot.
    pub fn image(&self) -> &SharedImage {
        &self.image
    }

    /// Layer configuration.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Statistics computed so far.
    pub fn statistics(&self) -> &StatisticsCache {
        &self.stats
    }

    /// Whether the image changed since the last query.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Drops cached statistics if the image changed and resets a channel the
    /// new image cannot provide.
    fn refresh(&mut self) {
        if !self.stale.swap(false, Ordering::AcqRel) {
            return;
        }
        self.stats.invalidate();
        let image = read_image(&self.image);
        let rep = image.volume().representation();
        if self.channel.validate(rep).is_err() {
            warn!(channel = %self.channel, "channel unavailable after image change, showing component 0");
            self.channel = Channel::default();
        }
    }

    /// Displayed channel.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Switches the displayed channel; statistics are recomputed lazily.
    pub fn set_channel(&mut self, channel: Channel) -> LayerResult<()> {
        self.refresh();
        channel.validate(read_image(&self.image).volume().representation())?;
        if channel != self.channel {
            self.channel = channel;
            self.stats.invalidate();
            debug!(%channel, "display channel changed");
        }
        Ok(())
    }

    /// Cached min/max of the displayed channel.
    pub fn intensity_range(&mut self) -> LayerResult<IntensityRange> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        Ok(self.stats.range(&view))
    }

    /// Storage-to-display scale factor.
    pub fn scale_factor(&mut self) -> LayerResult<f64> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        Ok(self.stats.scale_factor(&view))
    }

    /// Gradient magnitude upper limit, in native units when `native` is set.
    pub fn gradient_magnitude_upper_limit(&mut self, native: bool) -> LayerResult<f64> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        Ok(if native {
            self.stats
                .gradient_magnitude_upper_limit_native(&view, &image.native_mapping())
        } else {
            self.stats.gradient_magnitude_upper_limit(&view)
        })
    }

    /// Histogram of the displayed channel with the configured bin count.
    pub fn histogram(&mut self) -> LayerResult<Histogram> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        Ok(self.stats.histogram(&view, self.config.histogram_bins).clone())
    }

    /// Maps a stored value to `[0, 1]` over the cached range.
    ///
    /// Returns `0.0` when the range has zero width.
    pub fn normalize(&mut self, value: f64) -> LayerResult<f64> {
        Ok(self.intensity_range()?.normalize(value))
    }

    /// Color shown for `voxel`.
    pub fn display_color(&mut self, voxel: VoxelIndex) -> LayerResult<Rgba> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        let value = view.value(voxel)?;
        let t = self.stats.range(&view).normalize(value);
        Ok(self.color_map.evaluate(t))
    }

    /// Displayed channel value of `voxel` in native units.
    pub fn native_value(&mut self, voxel: VoxelIndex) -> LayerResult<f64> {
        self.refresh();
        let image = read_image(&self.image);
        let view = ScalarView::new(image.volume(), self.channel)?;
        Ok(image.native_mapping().to_native(view.value(voxel)?))
    }

    /// Full readout of `voxel`.
    pub fn readout(&mut self, voxel: VoxelIndex) -> LayerResult<VoxelReadout> {
        self.refresh();
        let image = read_image(&self.image);
        let mapping = image.native_mapping();
        let view = ScalarView::new(image.volume(), self.channel)?;
        let stored = view.value(voxel)?;
        let components = image
            .volume()
            .read_voxel(voxel)?
            .into_iter()
            .map(|v| mapping.to_native(v))
            .collect();
        let t = self.stats.range(&view).normalize(stored);
        Ok(VoxelReadout {
            voxel,
            stored,
            native: mapping.to_native(stored),
            components,
            color: self.color_map.evaluate(t),
        })
    }

    /// Committed color map.
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    /// Committed color map for programmatic edits.
    pub fn color_map_mut(&mut self) -> &mut ColorMap {
        &mut self.color_map
    }

    /// Color map editor state.
    pub fn editor(&self) -> &ColorMapEditController {
        &self.editor
    }

    /// Editor together with the map it edits.
    pub fn editor_and_map(&mut self) -> (&mut ColorMapEditController, &mut ColorMap) {
        (&mut self.editor, &mut self.color_map)
    }

    /// Replaces the color map points with a preset and clears the selection.
    pub fn apply_preset(&mut self, preset: ColorMapPreset) -> LayerResult<()> {
        self.color_map.set_points(preset.control_points())?;
        self.editor.deselect();
        debug!(%preset, revision = self.color_map.revision(), "preset applied");
        Ok(())
    }

    /// Lookup table of the committed map, resampled on revision change.
    pub fn display_lut(&mut self) -> LayerResult<&[Rgba]> {
        Ok(self.lut.get(&self.color_map, self.config.lut_size)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxl_core::{NativeMapping, Volume};

    fn layer_over(data: Vec<u16>) -> ImageLayer {
        let n = data.len();
        let image = ImageSource::new(
            Volume::from_samples([n, 1, 1], data).unwrap(),
            NativeMapping::new(0.5, -10.0),
        )
        .shared();
        ImageLayer::new(image, &LayerConfig::default()).unwrap()
    }

    #[test]
    fn test_display_color_linear() {
        let mut layer = layer_over(vec![0, 100, 200]);
        assert_eq!(layer.display_color([1, 0, 0]).unwrap(), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(layer.display_color([2, 0, 0]).unwrap(), [1.0, 1.0, 1.0, 1.0]);
        assert!(layer.display_color([3, 0, 0]).is_err());
    }

    #[test]
    fn test_native_value_and_readout() {
        let mut layer = layer_over(vec![0, 100, 200]);
        assert_eq!(layer.native_value([2, 0, 0]).unwrap(), 90.0);
        let r = layer.readout([1, 0, 0]).unwrap();
        assert_eq!(r.stored, 100.0);
        assert_eq!(r.native, 40.0);
        assert_eq!(r.components, vec![40.0]);
        assert_eq!(r.to_string(), "(1, 0, 0): 40");
    }

    #[test]
    fn test_gradient_native_variant() {
        let mut layer = layer_over(vec![0, 10, 20, 30]);
        assert_eq!(layer.gradient_magnitude_upper_limit(false).unwrap(), 10.0);
        assert_eq!(layer.gradient_magnitude_upper_limit(true).unwrap(), 5.0);
    }

    #[test]
    fn test_preset_resets_editor() {
        let mut layer = layer_over(vec![0, 1]);
        {
            let (editor, map) = layer.editor_and_map();
            editor.insert_at(map, 0.5).unwrap();
        }
        assert!(layer.editor().selection().is_some());
        let rev = layer.color_map().revision();
        layer.apply_preset(ColorMapPreset::Hot).unwrap();
        assert!(layer.editor().selection().is_none());
        assert_eq!(layer.color_map().revision(), rev + 1);
        assert_eq!(layer.color_map(), &ColorMapPreset::Hot.build());
    }

    #[test]
    fn test_display_lut_follows_edits() {
        let mut layer = layer_over(vec![0, 1]);
        assert_eq!(layer.display_lut().unwrap().len(), 256);
        layer.apply_preset(ColorMapPreset::BlackToRed).unwrap();
        assert_eq!(layer.display_lut().unwrap()[255], [1.0, 0.0, 0.0, 1.0]);
    }
}
