//! Piecewise color map over normalized intensity.
//!
//! A [`ColorMap`] is an ordered list of [`ControlPoint`]s over `[0, 1]`.
//! Between two points the color is interpolated linearly per channel; a
//! discontinuous point contributes its left color to the segment below and
//! its right color to the segment above.
//!
//! # Invariants
//!
//! - At least two points; the first sits at 0 and the last at 1 (pinned).
//! - Positions are strictly increasing.
//! - Every color channel lies in `[0, 1]`.
//!
//! Every successful mutation bumps [`revision`](ColorMap::revision) exactly
//! once. A failing mutation returns an error and leaves the map unchanged.
//!
//! # Example
//!
//! ```rust
//! use voxl_colormap::{ColorMap, Continuity, Side};
//!
//! let mut map = ColorMap::default(); // black -> white
//! assert_eq!(map.evaluate(0.5), [0.5, 0.5, 0.5, 1.0]);
//!
//! let i = map.insert_control_point(0.5, [1.0, 0.0, 0.0, 1.0]).unwrap();
//! map.set_continuity(i, Continuity::Discontinuous).unwrap();
//! map.set_color(i, Some(Side::Right), [0.0, 0.0, 1.0, 1.0]).unwrap();
//! assert_eq!(map.evaluate(0.5), [0.0, 0.0, 1.0, 1.0]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::serial::ColorMapRecord;
use crate::types::{check_rgba, Continuity, ControlPoint, Rgba, Side, BLACK, WHITE};
use crate::{ColorMapError, ColorMapResult};

/// Ordered, normalized-domain piecewise RGBA function.
///
/// Serializes through [`ColorMapRecord`]; deserialization validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ColorMapRecord", into = "ColorMapRecord")]
pub struct ColorMap {
    points: Vec<ControlPoint>,
    revision: u64,
}

impl PartialEq for ColorMap {
    /// Maps are equal when their control points are; revisions are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Default for ColorMap {
    /// Black at 0 to white at 1.
    fn default() -> Self {
        Self {
            points: vec![
                ControlPoint::continuous(0.0, BLACK),
                ControlPoint::continuous(1.0, WHITE),
            ],
            revision: 0,
        }
    }
}

/// Interpolates two colors; the result is clamped to `[0, 1]`.
#[inline]
fn lerp(a: Rgba, b: Rgba, f: f64) -> Rgba {
    let mut out = [0.0f32; 4];
    for (o, (&x, &y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        let v = x as f64 * (1.0 - f) + y as f64 * f;
        *o = (v as f32).clamp(0.0, 1.0);
    }
    out
}

fn validate_points(points: Vec<ControlPoint>) -> ColorMapResult<Vec<ControlPoint>> {
    if points.len() < 2 {
        return Err(ColorMapError::invalid(format!(
            "a color map needs at least 2 control points, got {}",
            points.len()
        )));
    }
    let points = points
        .into_iter()
        .map(ControlPoint::normalized)
        .collect::<ColorMapResult<Vec<_>>>()?;
    if points[0].position != 0.0 {
        return Err(ColorMapError::invalid("first control point must be at 0"));
    }
    if points[points.len() - 1].position != 1.0 {
        return Err(ColorMapError::invalid("last control point must be at 1"));
    }
    if let Some(w) = points.windows(2).find(|w| w[0].position >= w[1].position) {
        return Err(ColorMapError::invalid(format!(
            "positions must be strictly increasing ({} then {})",
            w[0].position, w[1].position
        )));
    }
    Ok(points)
}

impl ColorMap {
    /// Builds a map from control points, validating all invariants.
    pub fn new(points: Vec<ControlPoint>) -> ColorMapResult<Self> {
        Ok(Self {
            points: validate_points(points)?,
            revision: 0,
        })
    }

    /// Builds a map from a table already known to be valid.
    pub(crate) fn from_valid_points(points: Vec<ControlPoint>) -> Self {
        debug_assert!(validate_points(points.clone()).is_ok());
        Self {
            points,
            revision: 0,
        }
    }

    /// Control points in order.
    #[inline]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Number of control points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a map has at least the two endpoints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One control point.
    #[inline]
    pub fn point(&self, index: usize) -> Option<&ControlPoint> {
        self.points.get(index)
    }

    /// Change counter, bumped once per successful mutation.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `index` is one of the pinned endpoints.
    #[inline]
    pub fn is_endpoint(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.points.len()
    }

    /// Positions of the neighbours of `index` (the point must stay strictly
    /// between them). Endpoints report their own fixed position twice.
    pub fn position_bounds(&self, index: usize) -> Option<(f64, f64)> {
        let p = self.points.get(index)?;
        if self.is_endpoint(index) {
            return Some((p.position, p.position));
        }
        Some((self.points[index - 1].position, self.points[index + 1].position))
    }

    fn check_index(&self, index: usize) -> ColorMapResult<()> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(ColorMapError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    fn check_position(&self, index: usize, position: f64) -> ColorMapResult<()> {
        if self.is_endpoint(index) {
            let fixed = self.points[index].position;
            if position != fixed {
                return Err(ColorMapError::invalid(format!(
                    "endpoint {index} is pinned at {fixed}"
                )));
            }
            return Ok(());
        }
        let (lo, hi) = (self.points[index - 1].position, self.points[index + 1].position);
        if !(position > lo && position < hi) {
            return Err(ColorMapError::invalid(format!(
                "position {position} must lie strictly between {lo} and {hi}"
            )));
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Color at normalized intensity `t`.
    ///
    /// `t` is clamped to `[0, 1]` (NaN is treated as 0). At a control
    /// point's exact position the right color is returned.
    pub fn evaluate(&self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let upper = self.points.partition_point(|p| p.position <= t);
        let lo = &self.points[upper.saturating_sub(1)];
        if lo.position == t || upper >= self.points.len() {
            return lo.right;
        }
        let hi = &self.points[upper];
        let f = (t - lo.position) / (hi.position - lo.position);
        lerp(lo.right, hi.left, f)
    }

    /// Evenly spaced lookup table with `n >= 2` entries spanning `[0, 1]`.
    pub fn sample(&self, n: usize) -> ColorMapResult<Vec<Rgba>> {
        if n < 2 {
            return Err(ColorMapError::invalid(format!(
                "lookup table needs at least 2 entries, got {n}"
            )));
        }
        let last = (n - 1) as f64;
        Ok((0..n).map(|i| self.evaluate(i as f64 / last)).collect())
    }

    /// Inserts a continuous point strictly between the endpoints.
    ///
    /// Returns the index of the new point.
    pub fn insert_control_point(&mut self, position: f64, rgba: Rgba) -> ColorMapResult<usize> {
        self.insert(ControlPoint::continuous(position, rgba))
    }

    /// Inserts a (possibly discontinuous) point strictly between the
    /// endpoints, keeping the sequence sorted.
    pub fn insert(&mut self, point: ControlPoint) -> ColorMapResult<usize> {
        let point = point.normalized()?;
        let first = self.points[0].position;
        let last = self.points[self.points.len() - 1].position;
        if !(point.position > first && point.position < last) {
            return Err(ColorMapError::invalid(format!(
                "position {} must lie strictly between the endpoints",
                point.position
            )));
        }
        let index = self.points.partition_point(|p| p.position < point.position);
        if self.points[index].position == point.position {
            return Err(ColorMapError::invalid(format!(
                "a control point already exists at {}",
                point.position
            )));
        }
        self.points.insert(index, point);
        self.bump();
        debug!(index, position = point.position, "control point inserted");
        Ok(index)
    }

    /// Removes an interior control point.
    pub fn remove_control_point(&mut self, index: usize) -> ColorMapResult<ControlPoint> {
        self.check_index(index)?;
        if self.is_endpoint(index) {
            return Err(ColorMapError::invalid(format!(
                "control point {index} is a pinned endpoint"
            )));
        }
        let removed = self.points.remove(index);
        self.bump();
        debug!(index, position = removed.position, "control point removed");
        Ok(removed)
    }

    /// Changes continuity of a point (endpoints included).
    ///
    /// Collapsing a discontinuous point keeps its right color.
    pub fn set_continuity(&mut self, index: usize, continuity: Continuity) -> ColorMapResult<()> {
        self.check_index(index)?;
        self.points[index].set_continuity(continuity);
        self.bump();
        Ok(())
    }

    /// Recolors one side of a point (both sides when `side` is `None` or the
    /// point is continuous).
    pub fn set_color(&mut self, index: usize, side: Option<Side>, rgba: Rgba) -> ColorMapResult<()> {
        self.check_index(index)?;
        check_rgba(&rgba)?;
        self.points[index].set_color(side, rgba);
        self.bump();
        Ok(())
    }

    /// Moves an interior point between its neighbours.
    pub fn set_position(&mut self, index: usize, position: f64) -> ColorMapResult<()> {
        self.check_index(index)?;
        self.check_position(index, position)?;
        self.points[index].position = position;
        self.bump();
        Ok(())
    }

    /// Overwrites a point in one step.
    ///
    /// The new point must respect the ordering and pinning invariants. The
    /// revision is bumped even if nothing changed.
    pub fn replace_point(&mut self, index: usize, point: ControlPoint) -> ColorMapResult<()> {
        self.check_index(index)?;
        let point = point.normalized()?;
        self.check_position(index, point.position)?;
        self.points[index] = point;
        self.bump();
        Ok(())
    }

    /// Replaces all control points.
    pub fn set_points(&mut self, points: Vec<ControlPoint>) -> ColorMapResult<()> {
        self.points = validate_points(points)?;
        self.bump();
        debug!(points = self.points.len(), "control points replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];
    const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];

    fn red_blue_map() -> ColorMap {
        let mut map = ColorMap::default();
        let i = map.insert_control_point(0.5, RED).unwrap();
        map.set_continuity(i, Continuity::Discontinuous).unwrap();
        map.set_color(i, Some(Side::Right), BLUE).unwrap();
        map
    }

    #[test]
    fn test_default_midpoint() {
        let map = ColorMap::default();
        assert_eq!(map.evaluate(0.5), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(map.evaluate(0.0), BLACK);
        assert_eq!(map.evaluate(1.0), WHITE);
    }

    #[test]
    fn test_clamps_input() {
        let map = ColorMap::default();
        assert_eq!(map.evaluate(-3.0), BLACK);
        assert_eq!(map.evaluate(7.0), WHITE);
        assert_eq!(map.evaluate(f64::NAN), BLACK);
    }

    #[test]
    fn test_discontinuity_right_convention() {
        let map = red_blue_map();
        assert_eq!(map.evaluate(0.5), BLUE);

        let below = map.evaluate(0.49999);
        assert!((below[0] - 1.0).abs() < 1e-3);
        assert!(below[1].abs() < 1e-6 && below[2].abs() < 1e-6);

        let c = map.evaluate(0.9);
        assert!((c[0] - 0.8).abs() < 1e-6);
        assert!((c[1] - 0.8).abs() < 1e-6);
        assert!((c[2] - 1.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn test_insert_validation() {
        let mut map = ColorMap::default();
        assert!(map.insert_control_point(0.0, RED).is_err());
        assert!(map.insert_control_point(1.0, RED).is_err());
        assert!(map.insert_control_point(-0.1, RED).is_err());
        assert!(map.insert_control_point(0.5, [1.5, 0.0, 0.0, 1.0]).is_err());
        assert_eq!(map.revision(), 0);

        assert_eq!(map.insert_control_point(0.7, RED).unwrap(), 1);
        assert_eq!(map.insert_control_point(0.3, BLUE).unwrap(), 1);
        assert!(map.insert_control_point(0.7, BLUE).is_err());
        assert_eq!(map.len(), 4);
        assert_eq!(map.revision(), 2);
    }

    #[test]
    fn test_remove_endpoints_rejected() {
        let mut map = red_blue_map();
        let rev = map.revision();
        assert!(matches!(
            map.remove_control_point(0),
            Err(ColorMapError::InvalidArgument(_))
        ));
        assert!(map.remove_control_point(2).is_err());
        assert!(matches!(
            map.remove_control_point(9),
            Err(ColorMapError::IndexOutOfRange { index: 9, len: 3 })
        ));
        assert_eq!(map.revision(), rev);
        map.remove_control_point(1).unwrap();
        assert_eq!(map, ColorMap::default());
    }

    #[test]
    fn test_endpoint_continuity_allowed() {
        let mut map = ColorMap::default();
        map.set_continuity(1, Continuity::Discontinuous).unwrap();
        map.set_color(1, Some(Side::Left), RED).unwrap();
        assert_eq!(map.evaluate(1.0), WHITE);
        let below = map.evaluate(0.999999);
        assert!(below[0] > 0.99 && below[1] < 0.01);

        map.set_continuity(1, Continuity::Continuous).unwrap();
        assert_eq!(map.point(1).unwrap().left, WHITE);
    }

    #[test]
    fn test_set_position_bounds() {
        let mut map = ColorMap::default();
        map.insert_control_point(0.4, RED).unwrap();
        map.insert_control_point(0.6, BLUE).unwrap();
        assert!(map.set_position(1, 0.6).is_err());
        assert!(map.set_position(1, 0.0).is_err());
        map.set_position(1, 0.55).unwrap();
        assert!(map.set_position(0, 0.1).is_err());
        map.set_position(0, 0.0).unwrap();
        assert_eq!(map.position_bounds(1), Some((0.0, 0.6)));
        assert_eq!(map.position_bounds(3), Some((1.0, 1.0)));
    }

    #[test]
    fn test_replace_point_bumps_once() {
        let mut map = red_blue_map();
        let rev = map.revision();
        let p = *map.point(1).unwrap();
        map.replace_point(1, p).unwrap();
        assert_eq!(map.revision(), rev + 1);
        assert!(map
            .replace_point(1, ControlPoint::continuous(1.0, RED))
            .is_err());
        assert_eq!(map.revision(), rev + 1);
    }

    #[test]
    fn test_new_validation() {
        assert!(ColorMap::new(vec![ControlPoint::continuous(0.0, BLACK)]).is_err());
        assert!(ColorMap::new(vec![
            ControlPoint::continuous(0.1, BLACK),
            ControlPoint::continuous(1.0, WHITE),
        ])
        .is_err());
        assert!(ColorMap::new(vec![
            ControlPoint::continuous(0.0, BLACK),
            ControlPoint::continuous(0.5, RED),
            ControlPoint::continuous(0.5, BLUE),
            ControlPoint::continuous(1.0, WHITE),
        ])
        .is_err());
    }

    #[test]
    fn test_sample_lut() {
        let lut = ColorMap::default().sample(3).unwrap();
        assert_eq!(lut, vec![BLACK, [0.5, 0.5, 0.5, 1.0], WHITE]);
        assert!(ColorMap::default().sample(1).is_err());
    }
}
