//! # voxl-core
//!
//! Core types for the per-layer intensity pipeline of a volumetric viewer.
//!
//! This crate provides the image side of the pipeline:
//!
//! - [`Volume`] - Versioned 3-D sample buffer ([`Representation::Scalar`] or multi-component)
//! - [`Channel`], [`ScalarView`] - The scalar quantity displayed per voxel
//! - [`NativeMapping`] - Stored samples to native physical units
//! - [`StatisticsCache`] - Lazily computed range, scale factor, gradient limit, histogram
//! - [`ImageSource`], [`Subscription`] - Shared image slot with scoped change notifications
//!
//! ## Crate Structure
//!
//! ```text
//! voxl-core (this crate)
//!    ^
//!    |
//!    +-- voxl-colormap (control points, color maps, editing)
//!    +-- voxl-layer (display facade)
//!    +-- voxl-cli
//! ```
//!
//! ## Example
//!
//! ```rust
//! use voxl_core::{NativeMapping, ScalarView, StatisticsCache, Volume};
//!
//! let vol = Volume::from_samples([2, 2, 1], vec![0i16, 100, 200, 300]).unwrap();
//! let mapping = NativeMapping::new(1.0, -1024.0);
//!
//! let mut stats = StatisticsCache::new();
//! let range = stats.range(&ScalarView::scalar(&vol));
//! assert_eq!((range.min, range.max), (0.0, 300.0));
//! assert_eq!(mapping.to_native(range.max), -724.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod error;
pub mod native;
pub mod reduce;
pub mod sample;
pub mod source;
pub mod stats;
pub mod volume;

pub use channel::{Channel, ScalarView};
pub use error::{Error, Result};
pub use native::NativeMapping;
pub use sample::{Sample, SampleBuffer, SampleType};
pub use source::{ChangeNotifier, ImageEvent, ImageSource, SharedImage, Subscription};
pub use stats::{Histogram, IntensityRange, StatisticsCache};
pub use volume::{Representation, Volume, VoxelIndex};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{Channel, ScalarView};
    pub use crate::error::{Error, Result};
    pub use crate::native::NativeMapping;
    pub use crate::sample::{SampleBuffer, SampleType};
    pub use crate::source::{ImageEvent, ImageSource, SharedImage, Subscription};
    pub use crate::stats::{IntensityRange, StatisticsCache};
    pub use crate::volume::{Representation, Volume, VoxelIndex};
}
