//! Built-in color maps.
//!
//! Control point tables follow the usual scientific palettes. Every preset
//! builds a valid [`ColorMap`] with endpoints at 0 and 1.

use std::fmt;
use std::str::FromStr;

use crate::types::{ControlPoint, Rgba};
use crate::{ColorMap, ColorMapError};

/// Named system color map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMapPreset {
    /// Black to white.
    #[default]
    Grayscale,
    /// Dark blue, blue, cyan, yellow, red, dark red.
    Jet,
    /// Black, red, yellow, white.
    Hot,
    /// Cyan to magenta.
    Cool,
    /// Magenta to yellow.
    Spring,
    /// Green to yellow.
    Summer,
    /// Red to yellow.
    Autumn,
    /// Blue to green.
    Winter,
    /// Black to copper.
    Copper,
    /// Hue wheel.
    Hsv,
    /// Black to red.
    BlackToRed,
    /// Black to green.
    BlackToGreen,
    /// Black to blue.
    BlackToBlue,
    /// Diverging blue, white, red.
    BlueWhiteRed,
}

impl ColorMapPreset {
    /// All presets in menu order.
    pub const ALL: [ColorMapPreset; 14] = [
        Self::Grayscale,
        Self::Jet,
        Self::Hot,
        Self::Cool,
        Self::Spring,
        Self::Summer,
        Self::Autumn,
        Self::Winter,
        Self::Copper,
        Self::Hsv,
        Self::BlackToRed,
        Self::BlackToGreen,
        Self::BlackToBlue,
        Self::BlueWhiteRed,
    ];

    /// All presets in menu order.
    pub fn all() -> &'static [ColorMapPreset] {
        &Self::ALL
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Jet => "jet",
            Self::Hot => "hot",
            Self::Cool => "cool",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
            Self::Copper => "copper",
            Self::Hsv => "hsv",
            Self::BlackToRed => "black-to-red",
            Self::BlackToGreen => "black-to-green",
            Self::BlackToBlue => "black-to-blue",
            Self::BlueWhiteRed => "blue-white-red",
        }
    }

    /// Looks up a preset by name, ignoring case and `_`/`-` differences.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.iter().copied().find(|p| p.name() == key)
    }

    fn stops(self) -> &'static [(f64, Rgba)] {
        match self {
            Self::Grayscale => &[(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 1.0, 1.0])],
            Self::Jet => &[
                (0.0, [0.0, 0.0, 0.5, 1.0]),
                (0.125, [0.0, 0.0, 1.0, 1.0]),
                (0.375, [0.0, 1.0, 1.0, 1.0]),
                (0.625, [1.0, 1.0, 0.0, 1.0]),
                (0.875, [1.0, 0.0, 0.0, 1.0]),
                (1.0, [0.5, 0.0, 0.0, 1.0]),
            ],
            Self::Hot => &[
                (0.0, [0.0, 0.0, 0.0, 1.0]),
                (0.375, [1.0, 0.0, 0.0, 1.0]),
                (0.75, [1.0, 1.0, 0.0, 1.0]),
                (1.0, [1.0, 1.0, 1.0, 1.0]),
            ],
            Self::Cool => &[(0.0, [0.0, 1.0, 1.0, 1.0]), (1.0, [1.0, 0.0, 1.0, 1.0])],
            Self::Spring => &[(0.0, [1.0, 0.0, 1.0, 1.0]), (1.0, [1.0, 1.0, 0.0, 1.0])],
            Self::Summer => &[(0.0, [0.0, 0.5, 0.4, 1.0]), (1.0, [1.0, 1.0, 0.4, 1.0])],
            Self::Autumn => &[(0.0, [1.0, 0.0, 0.0, 1.0]), (1.0, [1.0, 1.0, 0.0, 1.0])],
            Self::Winter => &[(0.0, [0.0, 0.0, 1.0, 1.0]), (1.0, [0.0, 1.0, 0.5, 1.0])],
            Self::Copper => &[
                (0.0, [0.0, 0.0, 0.0, 1.0]),
                (0.8, [1.0, 0.625, 0.398, 1.0]),
                (1.0, [1.0, 0.7812, 0.4975, 1.0]),
            ],
            Self::Hsv => &[
                (0.0, [1.0, 0.0, 0.0, 1.0]),
                (1.0 / 6.0, [1.0, 1.0, 0.0, 1.0]),
                (2.0 / 6.0, [0.0, 1.0, 0.0, 1.0]),
                (3.0 / 6.0, [0.0, 1.0, 1.0, 1.0]),
                (4.0 / 6.0, [0.0, 0.0, 1.0, 1.0]),
                (5.0 / 6.0, [1.0, 0.0, 1.0, 1.0]),
                (1.0, [1.0, 0.0, 0.0, 1.0]),
            ],
            Self::BlackToRed => &[(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [1.0, 0.0, 0.0, 1.0])],
            Self::BlackToGreen => &[(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [0.0, 1.0, 0.0, 1.0])],
            Self::BlackToBlue => &[(0.0, [0.0, 0.0, 0.0, 1.0]), (1.0, [0.0, 0.0, 1.0, 1.0])],
            Self::BlueWhiteRed => &[
                (0.0, [0.0, 0.0, 1.0, 1.0]),
                (0.5, [1.0, 1.0, 1.0, 1.0]),
                (1.0, [1.0, 0.0, 0.0, 1.0]),
            ],
        }
    }

    /// Control points of the preset.
    pub fn control_points(self) -> Vec<ControlPoint> {
        self.stops()
            .iter()
            .map(|&(pos, rgba)| ControlPoint::continuous(pos, rgba))
            .collect()
    }

    /// Builds a fresh map (revision 0).
    pub fn build(self) -> ColorMap {
        ColorMap::from_valid_points(self.control_points())
    }
}

impl fmt::Display for ColorMapPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMapPreset {
    type Err = ColorMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ColorMapError::invalid(format!("unknown preset '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_valid() {
        for &preset in ColorMapPreset::all() {
            let points = preset.control_points();
            let map = ColorMap::new(points.clone())
                .unwrap_or_else(|e| panic!("{preset} invalid: {e}"));
            assert_eq!(map.points(), points.as_slice(), "{preset}");
        }
    }

    #[test]
    fn test_build_keeps_preset_table() {
        for &preset in ColorMapPreset::all() {
            let map = preset.build();
            assert_eq!(map.points(), preset.control_points().as_slice(), "{preset}");
            assert_eq!(map.revision(), 0);
        }
        assert_ne!(ColorMapPreset::Hot.build(), ColorMap::default());
    }

    #[test]
    fn test_name_roundtrip() {
        for &preset in ColorMapPreset::all() {
            assert_eq!(ColorMapPreset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(ColorMapPreset::from_name("Blue_White_Red"), Some(ColorMapPreset::BlueWhiteRed));
        assert_eq!(ColorMapPreset::from_name(" JET "), Some(ColorMapPreset::Jet));
        assert!("viridis".parse::<ColorMapPreset>().is_err());
    }

    #[test]
    fn test_grayscale_is_default_map() {
        assert_eq!(ColorMapPreset::Grayscale.build(), ColorMap::default());
    }
}
