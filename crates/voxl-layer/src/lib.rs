//! # voxl-layer
//!
//! Per-layer display pipeline for volumetric images.
//!
//! [`ImageLayer`] answers "what color and what value do I show for this
//! voxel": it normalizes the stored sample against the cached intensity
//! range, evaluates the layer's color map and converts values to native
//! units. Statistics are computed lazily and dropped when the image changes.
//!
//! ## Example
//!
//! ```rust
//! use voxl_core::{ImageSource, NativeMapping, Volume};
//! use voxl_layer::{ImageLayer, LayerConfig};
//!
//! let image = ImageSource::new(
//!     Volume::from_samples([3, 1, 1], vec![0i16, 50, 100]).unwrap(),
//!     NativeMapping::new(1.0, -1024.0),
//! )
//! .shared();
//!
//! let mut layer = ImageLayer::new(image, &LayerConfig::default()).unwrap();
//! assert_eq!(layer.display_color([1, 0, 0]).unwrap(), [0.5, 0.5, 0.5, 1.0]);
//! assert_eq!(layer.native_value([2, 0, 0]).unwrap(), -924.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod layer;

pub use config::LayerConfig;
pub use error::{LayerError, LayerResult};
pub use layer::{ImageLayer, VoxelReadout};
