//! Color map error types.

use thiserror::Error;

/// Result type for color map operations.
pub type ColorMapResult<T> = Result<T, ColorMapError>;

/// Errors that can occur while editing or loading color maps.
///
/// Every failing mutator leaves the map untouched.
#[derive(Debug, Error)]
pub enum ColorMapError {
    /// Position out of range, collision, endpoint removal, bad color.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Control point index past the end of the map.
    #[error("control point {index} out of range for map with {len} points")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of control points
        len: usize,
    },

    /// The map changed while an edit was staged against it.
    #[error("color map changed during edit (staged at revision {staged}, now {current})")]
    StaleEdit {
        /// Revision the staged copy was taken from
        staged: u64,
        /// Current revision
        current: u64,
    },

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ColorMapError {
    /// Creates an [`ColorMapError::InvalidArgument`] error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
