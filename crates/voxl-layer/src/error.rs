//! Layer error types.

use std::path::PathBuf;

use thiserror::Error;
use voxl_colormap::ColorMapError;

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

/// Errors that can occur while querying or configuring a layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// Image access failed (bounds, channel).
    #[error("image error: {0}")]
    Core(#[from] voxl_core::Error),

    /// Color map edit or persistence failed.
    #[error("color map error: {0}")]
    ColorMap(#[from] ColorMapError),

    /// Configuration value rejected.
    #[error("invalid layer config: {0}")]
    Config(String),

    /// Configuration file missing.
    #[error("config not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// YAML parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerError {
    /// Creates a [`LayerError::Config`] error.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
