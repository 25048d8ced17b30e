//! YAML persistence for color maps.
//!
//! The on-disk form is a flat record list:
//!
//! ```yaml
//! points:
//!   - position: 0.0
//!     left: [0.0, 0.0, 0.0, 1.0]
//!     right: [0.0, 0.0, 0.0, 1.0]
//!     continuity: continuous
//!   - position: 1.0
//!     left: [1.0, 1.0, 1.0, 1.0]
//!     right: [1.0, 1.0, 1.0, 1.0]
//!     continuity: continuous
//! ```
//!
//! Loading validates every map invariant. Floats are written in shortest
//! round-trip form, so a saved and reloaded map evaluates bit-identically.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Continuity, ControlPoint, Rgba};
use crate::{ColorMap, ColorMapError, ColorMapResult};

/// Serialized control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPointRecord {
    /// Normalized position.
    pub position: f64,
    /// Left color.
    pub left: Rgba,
    /// Right color.
    pub right: Rgba,
    /// Continuity, continuous when omitted.
    #[serde(default)]
    pub continuity: Continuity,
}

/// Serialized color map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMapRecord {
    /// Control points in order.
    pub points: Vec<ControlPointRecord>,
}

impl From<ControlPointRecord> for ControlPoint {
    fn from(r: ControlPointRecord) -> Self {
        Self {
            position: r.position,
            left: r.left,
            right: r.right,
            continuity: r.continuity,
        }
    }
}

impl From<&ControlPoint> for ControlPointRecord {
    fn from(p: &ControlPoint) -> Self {
        Self {
            position: p.position,
            left: p.left,
            right: p.right,
            continuity: p.continuity,
        }
    }
}

impl From<ColorMap> for ColorMapRecord {
    fn from(map: ColorMap) -> Self {
        Self::from(&map)
    }
}

impl From<&ColorMap> for ColorMapRecord {
    fn from(map: &ColorMap) -> Self {
        Self {
            points: map.points().iter().map(ControlPointRecord::from).collect(),
        }
    }
}

impl TryFrom<ColorMapRecord> for ColorMap {
    type Error = ColorMapError;

    fn try_from(record: ColorMapRecord) -> ColorMapResult<Self> {
        ColorMap::new(record.points.into_iter().map(ControlPoint::from).collect())
    }
}

impl ColorMap {
    /// Serializes to a YAML document.
    pub fn to_yaml(&self) -> ColorMapResult<String> {
        Ok(serde_yaml::to_string(&ColorMapRecord::from(self))?)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> ColorMapResult<Self> {
        let record: ColorMapRecord = serde_yaml::from_str(yaml)?;
        Self::try_from(record)
    }

    /// Writes the map to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> ColorMapResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml()?)?;
        debug!(path = %path.display(), points = self.len(), "color map saved");
        Ok(())
    }

    /// Reads a map from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ColorMapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let map = Self::from_yaml(&content)?;
        debug!(path = %path.display(), points = map.len(), "color map loaded");
        Ok(map)
    }
}
