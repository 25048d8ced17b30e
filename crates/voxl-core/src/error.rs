//! Error types for voxl-core operations.
//!
//! The [`Error`] enum covers the failure modes of volume construction,
//! voxel access and channel selection. Statistics queries never fail:
//! empty and constant volumes have defined results instead.
//!
//! # Usage
//!
//! ```rust
//! use voxl_core::{Error, Result};
//!
//! fn check(x: usize, y: usize, z: usize, dims: [usize; 3]) -> Result<()> {
//!     if x >= dims[0] || y >= dims[1] || z >= dims[2] {
//!         return Err(Error::out_of_bounds([x, y, z], dims));
//!     }
//!     Ok(())
//! }
//! assert!(check(4, 0, 0, [4, 4, 4]).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading volumes.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`ComponentOutOfRange`](Error::ComponentOutOfRange)
/// - **Construction errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`BufferLength`](Error::BufferLength), [`InvalidSpacing`](Error::InvalidSpacing)
/// - **Display errors**: [`InvalidChannel`](Error::InvalidChannel)
#[derive(Debug, Error)]
pub enum Error {
    /// Voxel coordinates are outside the volume.
    #[error("voxel ({x}, {y}, {z}) out of bounds for volume {width}x{height}x{depth}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: usize,
        /// Y coordinate that was out of bounds
        y: usize,
        /// Z coordinate that was out of bounds
        z: usize,
        /// Volume width
        width: usize,
        /// Volume height
        height: usize,
        /// Volume depth
        depth: usize,
    },

    /// Component index exceeds the number of components per voxel.
    #[error("component {component} out of range for {count}-component volume")]
    ComponentOutOfRange {
        /// Requested component
        component: usize,
        /// Components per voxel
        count: usize,
    },

    /// Dimensions cannot describe a buffer (overflow, zero components).
    #[error("invalid dimensions: {width}x{height}x{depth} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Requested depth
        depth: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Sample buffer length does not match dimensions times components.
    #[error("buffer holds {got} samples, expected {expected}")]
    BufferLength {
        /// Samples required by the dimensions
        expected: usize,
        /// Samples provided
        got: usize,
    },

    /// Voxel spacing must be finite and positive on every axis.
    #[error("invalid voxel spacing [{0}, {1}, {2}]")]
    InvalidSpacing(f64, f64, f64),

    /// Display channel does not apply to this volume.
    #[error("channel {channel} not available: {reason}")]
    InvalidChannel {
        /// Channel description
        channel: String,
        /// Why it was rejected
        reason: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(voxel: [usize; 3], dims: [usize; 3]) -> Self {
        Self::OutOfBounds {
            x: voxel[0],
            y: voxel[1],
            z: voxel[2],
            width: dims[0],
            height: dims[1],
            depth: dims[2],
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(dims: [usize; 3], reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width: dims[0],
            height: dims[1],
            depth: dims[2],
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidChannel`] error.
    #[inline]
    pub fn invalid_channel(channel: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidChannel {
            channel: channel.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::ComponentOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds([10, 2, 3], [8, 4, 4]);
        let msg = err.to_string();
        assert!(msg.contains("(10, 2, 3)"));
        assert!(msg.contains("8x4x4"));
        assert!(err.is_bounds_error());
    }

    #[test]
    fn test_invalid_channel() {
        let err = Error::invalid_channel("component 3", "scalar volume");
        assert!(err.to_string().contains("component 3"));
        assert!(!err.is_bounds_error());
    }
}
