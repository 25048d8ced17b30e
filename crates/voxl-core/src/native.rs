//! Mapping between stored samples and native intensity units.
//!
//! Images are frequently stored rescaled (e.g. CT data in `i16` with a
//! rescale slope and intercept). The native mapping recovers the original
//! physical value for readout:
//!
//! ```text
//! native = stored * slope + intercept
//! ```

/// Affine transform from stored sample values to native units.
///
/// Fixed at image load time. Replacing it means constructing a new mapping
/// and swapping it in together with the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeMapping {
    slope: f64,
    intercept: f64,
}

impl NativeMapping {
    /// Creates a mapping.
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// The identity mapping (stored values already are native).
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Multiplicative term.
    #[inline]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Additive term.
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Converts a stored value to native units.
    #[inline]
    pub fn to_native(&self, stored: f64) -> f64 {
        stored * self.slope + self.intercept
    }

    /// Converts a native value back to stored units.
    ///
    /// Returns `None` when the slope is zero and the mapping has no inverse.
    #[inline]
    pub fn from_native(&self, native: f64) -> Option<f64> {
        if self.slope == 0.0 {
            None
        } else {
            Some((native - self.intercept) / self.slope)
        }
    }

    /// Scale applied to differences (e.g. gradients) between stored values.
    #[inline]
    pub fn scale_magnitude(&self) -> f64 {
        self.slope.abs()
    }

    /// Whether this mapping leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }
}

impl Default for NativeMapping {
    fn default() -> Self {
        Self::identity()
    }
}
