//! # voxl-colormap
//!
//! Control-point color maps for mapping normalized intensity to RGBA.
//!
//! - [`ColorMap`] - Ordered control points over `[0, 1]`, with optional jumps
//! - [`ColorMapPreset`] - Built-in palettes
//! - [`ColorMapEditController`] - Hit testing, selection, staged drag edits
//! - [`SharedColorMap`] - Reader/writer handle for a render thread
//! - [`LutCache`] - Lookup table resampled only on revision change
//!
//! Maps persist as YAML through [`ColorMapRecord`].
//!
//! ## Example
//!
//! ```rust
//! use voxl_colormap::{ColorMapPreset, LutCache};
//!
//! let map = ColorMapPreset::Hot.build();
//! let mut lut = LutCache::new();
//! let table = lut.get(&map, 256).unwrap();
//! assert_eq!(table[0], [0.0, 0.0, 0.0, 1.0]);
//! assert_eq!(table[255], [1.0, 1.0, 1.0, 1.0]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod edit;
pub mod error;
pub mod lut;
pub mod map;
pub mod presets;
pub mod serial;
pub mod shared;
pub mod types;

pub use edit::{BoxPoint, ColorMapEditController, DragMode, EditState, Selection, StagedEdit, UiState};
pub use error::{ColorMapError, ColorMapResult};
pub use lut::LutCache;
pub use map::ColorMap;
pub use presets::ColorMapPreset;
pub use serial::{ColorMapRecord, ControlPointRecord};
pub use shared::SharedColorMap;
pub use types::{Continuity, ControlPoint, Rgba, Side, BLACK, WHITE};
