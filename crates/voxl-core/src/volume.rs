//! Volumetric image buffer.
//!
//! A [`Volume`] is a 3-D grid of voxels, each holding one or more stored
//! samples. Samples are laid out x-fastest, then y, then z, with the
//! components of a voxel interleaved:
//!
//! ```text
//! index = ((z * height + y) * width + x) * components + c
//! ```
//!
//! # Identity
//!
//! Every volume carries a [`version`](Volume::version) token. A freshly
//! created buffer gets a process-unique version, and every mutation assigns
//! a new one. Clones share the buffer through an [`Arc`] and keep the same
//! version until one of them is mutated (copy-on-write). Caches key their
//! results by this token.
//!
//! # Example
//!
//! ```rust
//! use voxl_core::Volume;
//!
//! let mut vol = Volume::from_samples([2, 2, 1], vec![0u8, 10, 20, 30]).unwrap();
//! assert_eq!(vol.read_sample([1, 1, 0], 0).unwrap(), 30.0);
//!
//! let before = vol.version();
//! vol.set_sample([0, 0, 0], 0, 5.0).unwrap();
//! assert_ne!(vol.version(), before);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::sample::{Sample, SampleBuffer, SampleType};
use crate::{Error, Result};

/// Integer voxel coordinates `[x, y, z]`.
pub type VoxelIndex = [usize; 3];

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique buffer version.
fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// How the samples of a voxel are organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    /// One sample per voxel.
    #[default]
    Scalar,
    /// Several samples per voxel (vector fields, color volumes).
    MultiComponent {
        /// Samples per voxel
        count: usize,
    },
}

impl Representation {
    /// Samples per voxel.
    #[inline]
    pub const fn components(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::MultiComponent { count } => *count,
        }
    }

    /// Picks the representation for a component count.
    pub fn with_components(count: usize) -> Result<Self> {
        match count {
            0 => Err(Error::other("a voxel needs at least one component")),
            1 => Ok(Self::Scalar),
            n => Ok(Self::MultiComponent { count: n }),
        }
    }
}

/// Owned 3-D sample buffer with a version token.
#[derive(Debug, Clone)]
pub struct Volume {
    dims: [usize; 3],
    spacing: [f64; 3],
    representation: Representation,
    buffer: Arc<SampleBuffer>,
    version: u64,
}

impl Volume {
    /// Wraps a sample buffer.
    ///
    /// The buffer length must equal `w * h * d * components`. Dimensions may
    /// be zero, which yields an empty placeholder volume.
    pub fn new(
        dims: [usize; 3],
        representation: Representation,
        buffer: SampleBuffer,
    ) -> Result<Self> {
        let components = representation.components();
        if components == 0 {
            return Err(Error::invalid_dimensions(dims, "zero components per voxel"));
        }
        let expected = dims
            .iter()
            .try_fold(components, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::invalid_dimensions(dims, "sample count overflows usize"))?;
        if buffer.len() != expected {
            return Err(Error::BufferLength {
                expected,
                got: buffer.len(),
            });
        }
        Ok(Self {
            dims,
            spacing: [1.0; 3],
            representation,
            buffer: Arc::new(buffer),
            version: next_version(),
        })
    }

    /// Creates a scalar volume from typed samples.
    pub fn from_samples<T: Sample>(dims: [usize; 3], data: Vec<T>) -> Result<Self> {
        Self::new(dims, Representation::Scalar, data.into())
    }

    /// Creates a zero-filled volume.
    pub fn zeros(
        dims: [usize; 3],
        representation: Representation,
        sample_type: SampleType,
    ) -> Result<Self> {
        let len = dims
            .iter()
            .try_fold(representation.components(), |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::invalid_dimensions(dims, "sample count overflows usize"))?;
        Self::new(dims, representation, SampleBuffer::zeros(sample_type, len))
    }

    /// Creates an empty scalar placeholder volume.
    pub fn empty(sample_type: SampleType) -> Self {
        Self {
            dims: [0; 3],
            spacing: [1.0; 3],
            representation: Representation::Scalar,
            buffer: Arc::new(SampleBuffer::zeros(sample_type, 0)),
            version: next_version(),
        }
    }

    /// Sets the physical voxel spacing.
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> Result<Self> {
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(Error::InvalidSpacing(spacing[0], spacing[1], spacing[2]));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Dimensions `[width, height, depth]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Physical voxel spacing.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Sample organization.
    #[inline]
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Samples per voxel.
    #[inline]
    pub fn components(&self) -> usize {
        self.representation.components()
    }

    /// Storage precision.
    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.buffer.sample_type()
    }

    /// Number of voxels.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Returns true if the volume has no voxels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxel_count() == 0
    }

    /// Identity token of the current buffer contents.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Read access to the raw buffer.
    #[inline]
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Flat voxel index of a coordinate, checking bounds.
    pub fn linear_index(&self, voxel: VoxelIndex) -> Result<usize> {
        let [w, h, d] = self.dims;
        let [x, y, z] = voxel;
        if x >= w || y >= h || z >= d {
            return Err(Error::out_of_bounds(voxel, self.dims));
        }
        Ok((z * h + y) * w + x)
    }

    /// Voxel coordinate of a flat voxel index.
    #[inline]
    pub fn coordinate(&self, linear: usize) -> VoxelIndex {
        let [w, h, _] = self.dims;
        [linear % w, (linear / w) % h, linear / (w * h)]
    }

    /// Reads one stored sample.
    pub fn read_sample(&self, voxel: VoxelIndex, component: usize) -> Result<f64> {
        let count = self.components();
        if component >= count {
            return Err(Error::ComponentOutOfRange { component, count });
        }
        let index = self.linear_index(voxel)? * count + component;
        self.buffer
            .get(index)
            .ok_or_else(|| Error::other(format!("sample {index} missing from buffer")))
    }

    /// Reads every component of a voxel.
    pub fn read_voxel(&self, voxel: VoxelIndex) -> Result<Vec<f64>> {
        let count = self.components();
        let base = self.linear_index(voxel)? * count;
        Ok((0..count)
            .filter_map(|c| self.buffer.get(base + c))
            .collect())
    }

    /// Reads component `component` at a flat voxel index without bounds
    /// reporting. Used by full-volume reductions.
    #[inline]
    pub(crate) fn sample_at(&self, linear: usize, component: usize) -> f64 {
        self.buffer
            .get(linear * self.components() + component)
            .unwrap_or(0.0)
    }

    /// Writes one stored sample and assigns a new version.
    pub fn set_sample(&mut self, voxel: VoxelIndex, component: usize, value: f64) -> Result<()> {
        let count = self.components();
        if component >= count {
            return Err(Error::ComponentOutOfRange { component, count });
        }
        let index = self.linear_index(voxel)? * count + component;
        if !Arc::make_mut(&mut self.buffer).set(index, value) {
            return Err(Error::other(format!("sample {index} missing from buffer")));
        }
        self.version = next_version();
        Ok(())
    }

    /// Replaces the sample buffer, keeping dimensions and representation.
    pub fn replace_buffer(&mut self, buffer: SampleBuffer) -> Result<()> {
        let expected = self.voxel_count() * self.components();
        if buffer.len() != expected {
            return Err(Error::BufferLength {
                expected,
                got: buffer.len(),
            });
        }
        self.buffer = Arc::new(buffer);
        self.version = next_version();
        Ok(())
    }
}
