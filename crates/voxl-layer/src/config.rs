//! Layer configuration.
//!
//! Loaded from YAML; missing keys fall back to [`LayerConfig::default`].
//!
//! ```yaml
//! hit_radius: 0.02
//! histogram_bins: 256
//! lut_size: 256
//! default_preset: grayscale
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use voxl_colormap::ColorMapPreset;

use crate::{LayerError, LayerResult};

/// Per-layer settings for the editor, histogram and lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Marker hit radius in normalized editor box units.
    pub hit_radius: f64,
    /// Number of histogram bins.
    pub histogram_bins: usize,
    /// Number of entries in the display lookup table.
    pub lut_size: usize,
    /// Color map a new layer starts with.
    pub default_preset: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            hit_radius: 0.02,
            histogram_bins: 256,
            lut_size: 256,
            default_preset: ColorMapPreset::Grayscale.name().to_string(),
        }
    }
}

impl LayerConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> LayerResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> LayerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LayerError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Checks value ranges and the preset name.
    pub fn validate(&self) -> LayerResult<()> {
        if !self.hit_radius.is_finite() || self.hit_radius <= 0.0 {
            return Err(LayerError::config(format!(
                "hit_radius must be positive, got {}",
                self.hit_radius
            )));
        }
        if self.histogram_bins == 0 {
            return Err(LayerError::config("histogram_bins must be at least 1"));
        }
        if self.lut_size < 2 {
            return Err(LayerError::config(format!(
                "lut_size must be at least 2, got {}",
                self.lut_size
            )));
        }
        self.preset().map(|_| ())
    }

    /// The configured default preset.
    pub fn preset(&self) -> LayerResult<ColorMapPreset> {
        ColorMapPreset::from_name(&self.default_preset)
            .ok_or_else(|| LayerError::config(format!("unknown preset '{}'", self.default_preset)))
    }
}
