//! Control point types.

use serde::{Deserialize, Serialize};

use crate::{ColorMapError, ColorMapResult};

/// Color with opacity, each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Opaque black.
pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Opaque white.
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Whether a control point has one color or a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continuity {
    /// Single-valued: the map is continuous through the point.
    #[default]
    Continuous,
    /// Two colors: the left and right limits differ.
    Discontinuous,
}

/// Which of the two colors of a discontinuous point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Limit approaching from below.
    Left,
    /// Limit approaching from above.
    Right,
}

/// Checks that every channel is a finite value in `[0, 1]`.
pub(crate) fn check_rgba(rgba: &Rgba) -> ColorMapResult<()> {
    if rgba.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c)) {
        Ok(())
    } else {
        Err(ColorMapError::invalid(format!(
            "color {rgba:?} has channels outside [0, 1]"
        )))
    }
}

/// One anchor of a piecewise color function.
///
/// A continuous point keeps `left == right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Normalized intensity in `[0, 1]`.
    pub position: f64,
    /// Color of the left limit.
    pub left: Rgba,
    /// Color of the right limit.
    pub right: Rgba,
    /// Continuity type.
    pub continuity: Continuity,
}

impl ControlPoint {
    /// Creates a single-colored point.
    pub fn continuous(position: f64, rgba: Rgba) -> Self {
        Self {
            position,
            left: rgba,
            right: rgba,
            continuity: Continuity::Continuous,
        }
    }

    /// Creates a point with a color jump.
    pub fn discontinuous(position: f64, left: Rgba, right: Rgba) -> Self {
        Self {
            position,
            left,
            right,
            continuity: Continuity::Discontinuous,
        }
    }

    /// Whether the point has two colors.
    #[inline]
    pub fn is_discontinuous(&self) -> bool {
        self.continuity == Continuity::Discontinuous
    }

    /// Color of one side.
    #[inline]
    pub fn color(&self, side: Side) -> Rgba {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Sets one side, or both when `side` is `None` or the point is
    /// continuous.
    pub fn set_color(&mut self, side: Option<Side>, rgba: Rgba) {
        match (self.continuity, side) {
            (Continuity::Discontinuous, Some(Side::Left)) => self.left = rgba,
            (Continuity::Discontinuous, Some(Side::Right)) => self.right = rgba,
            _ => {
                self.left = rgba;
                self.right = rgba;
            }
        }
    }

    /// Changes continuity.
    ///
    /// Collapsing to continuous keeps the right color; splitting duplicates
    /// the single color to both sides.
    pub fn set_continuity(&mut self, continuity: Continuity) {
        self.continuity = continuity;
        if continuity == Continuity::Continuous {
            self.left = self.right;
        }
    }

    /// Validates position and colors, returning the canonical form
    /// (continuous points get `left = right`).
    pub(crate) fn normalized(mut self) -> ColorMapResult<Self> {
        if !self.position.is_finite() || !(0.0..=1.0).contains(&self.position) {
            return Err(ColorMapError::invalid(format!(
                "position {} outside [0, 1]",
                self.position
            )));
        }
        check_rgba(&self.left)?;
        check_rgba(&self.right)?;
        if self.continuity == Continuity::Continuous {
            self.left = self.right;
        }
        Ok(self)
    }
}
