//! Stored sample types and the typed sample buffer.
//!
//! Volumes keep their samples in the precision they were loaded with. The
//! rest of the pipeline only ever sees `f64` values, so this module provides:
//!
//! - [`SampleType`] - Runtime tag for the storage precision
//! - [`Sample`] - Trait implemented by every storable component type
//! - [`SampleBuffer`] - Closed set of typed buffers with `f64` access
//!
//! # Example
//!
//! ```rust
//! use voxl_core::sample::{SampleBuffer, SampleType};
//!
//! let buffer = SampleBuffer::from(vec![0u16, 100, 65535]);
//! assert_eq!(buffer.sample_type(), SampleType::U16);
//! assert_eq!(buffer.get(2), Some(65535.0));
//! ```

/// Storage precision of volume samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer.
    I8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit signed integer (typical CT data).
    I16,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit signed integer.
    I32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl SampleType {
    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Bytes per stored component.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Smallest and largest representable value.
    pub fn representable_range(&self) -> (f64, f64) {
        match self {
            Self::U8 => (u8::MIN as f64, u8::MAX as f64),
            Self::I8 => (i8::MIN as f64, i8::MAX as f64),
            Self::U16 => (u16::MIN as f64, u16::MAX as f64),
            Self::I16 => (i16::MIN as f64, i16::MAX as f64),
            Self::U32 => (u32::MIN as f64, u32::MAX as f64),
            Self::I32 => (i32::MIN as f64, i32::MAX as f64),
            Self::F32 => (f32::MIN as f64, f32::MAX as f64),
            Self::F64 => (f64::MIN, f64::MAX),
        }
    }

    /// Span used to relate stored values to a normalized display range.
    ///
    /// Integer types use their full representable span; float types have no
    /// meaningful storage span and use `1.0`.
    pub fn display_span(&self) -> f64 {
        if self.is_float() {
            1.0
        } else {
            let (lo, hi) = self.representable_range();
            hi - lo
        }
    }

    /// Lower-case type name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Parses a type name as produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "u8" | "uchar" => Some(Self::U8),
            "i8" | "char" => Some(Self::I8),
            "u16" | "ushort" => Some(Self::U16),
            "i16" | "short" => Some(Self::I16),
            "u32" | "uint" => Some(Self::U32),
            "i32" | "int" => Some(Self::I32),
            "f32" | "float" => Some(Self::F32),
            "f64" | "double" => Some(Self::F64),
            _ => None,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A component type that can be stored in a [`SampleBuffer`].
///
/// Unlike display pixel formats, samples are never normalized: `to_f64`
/// returns the stored value itself.
pub trait Sample: Copy + Send + Sync + PartialOrd + 'static {
    /// Runtime tag of this type.
    const TYPE: SampleType;

    /// Widens the stored value.
    fn to_f64(self) -> f64;

    /// Narrows a value, rounding and saturating for integer types.
    fn from_f64(v: f64) -> Self;

    /// Wraps a vector of samples in the matching buffer variant.
    fn into_buffer(data: Vec<Self>) -> SampleBuffer;
}

macro_rules! impl_int_sample {
    ($t:ty, $variant:ident) => {
        impl Sample for $t {
            const TYPE: SampleType = SampleType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // `as` saturates and maps NaN to zero.
                v.round() as $t
            }

            fn into_buffer(data: Vec<Self>) -> SampleBuffer {
                SampleBuffer::$variant(data)
            }
        }
    };
}

impl_int_sample!(u8, U8);
impl_int_sample!(i8, I8);
impl_int_sample!(u16, U16);
impl_int_sample!(i16, I16);
impl_int_sample!(u32, U32);
impl_int_sample!(i32, I32);

impl Sample for f32 {
    const TYPE: SampleType = SampleType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn into_buffer(data: Vec<Self>) -> SampleBuffer {
        SampleBuffer::F32(data)
    }
}

impl Sample for f64 {
    const TYPE: SampleType = SampleType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    fn into_buffer(data: Vec<Self>) -> SampleBuffer {
        SampleBuffer::F64(data)
    }
}

/// Typed sample storage.
///
/// One variant per [`SampleType`]. Access goes through `f64` so callers stay
/// independent of the storage precision.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    /// 8-bit unsigned samples.
    U8(Vec<u8>),
    /// 8-bit signed samples.
    I8(Vec<i8>),
    /// 16-bit unsigned samples.
    U16(Vec<u16>),
    /// 16-bit signed samples.
    I16(Vec<i16>),
    /// 32-bit unsigned samples.
    U32(Vec<u32>),
    /// 32-bit signed samples.
    I32(Vec<i32>),
    /// 32-bit float samples.
    F32(Vec<f32>),
    /// 64-bit float samples.
    F64(Vec<f64>),
}

macro_rules! dispatch {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            SampleBuffer::U8($v) => $body,
            SampleBuffer::I8($v) => $body,
            SampleBuffer::U16($v) => $body,
            SampleBuffer::I16($v) => $body,
            SampleBuffer::U32($v) => $body,
            SampleBuffer::I32($v) => $body,
            SampleBuffer::F32($v) => $body,
            SampleBuffer::F64($v) => $body,
        }
    };
}

impl SampleBuffer {
    /// Creates a zero-filled buffer of the given type.
    pub fn zeros(sample_type: SampleType, len: usize) -> Self {
        match sample_type {
            SampleType::U8 => Self::U8(vec![0; len]),
            SampleType::I8 => Self::I8(vec![0; len]),
            SampleType::U16 => Self::U16(vec![0; len]),
            SampleType::I16 => Self::I16(vec![0; len]),
            SampleType::U32 => Self::U32(vec![0; len]),
            SampleType::I32 => Self::I32(vec![0; len]),
            SampleType::F32 => Self::F32(vec![0.0; len]),
            SampleType::F64 => Self::F64(vec![0.0; len]),
        }
    }

    /// Storage precision of this buffer.
    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::U8(_) => SampleType::U8,
            Self::I8(_) => SampleType::I8,
            Self::U16(_) => SampleType::U16,
            Self::I16(_) => SampleType::I16,
            Self::U32(_) => SampleType::U32,
            Self::I32(_) => SampleType::I32,
            Self::F32(_) => SampleType::F32,
            Self::F64(_) => SampleType::F64,
        }
    }

    /// Number of stored components.
    #[inline]
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    /// Returns true if the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the sample at a flat index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        dispatch!(self, v => v.get(index).map(|s| s.to_f64()))
    }

    /// Writes the sample at a flat index, converting to the storage type.
    ///
    /// Returns false if the index is out of range.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        dispatch!(self, v => match v.get_mut(index) {
            Some(slot) => {
                *slot = Sample::from_f64(value);
                true
            }
            None => false,
        })
    }
}

impl<T: Sample> From<Vec<T>> for SampleBuffer {
    fn from(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(SampleBuffer::from(vec![1i16]).sample_type(), SampleType::I16);
        assert_eq!(SampleBuffer::from(vec![1.0f32]).sample_type(), SampleType::F32);
        assert_eq!(SampleBuffer::zeros(SampleType::U32, 3).len(), 3);
    }

    #[test]
    fn test_integer_set_saturates() {
        let mut buf = SampleBuffer::from(vec![0u8; 2]);
        assert!(buf.set(0, 300.0));
        assert!(buf.set(1, -4.0));
        assert_eq!(buf.get(0), Some(255.0));
        assert_eq!(buf.get(1), Some(0.0));
        assert!(!buf.set(2, 1.0));
    }

    #[test]
    fn test_display_span() {
        assert_eq!(SampleType::U8.display_span(), 255.0);
        assert_eq!(SampleType::I16.display_span(), 65535.0);
        assert_eq!(SampleType::F32.display_span(), 1.0);
    }

    #[test]
    fn test_names_round_trip() {
        for t in [
            SampleType::U8,
            SampleType::I8,
            SampleType::U16,
            SampleType::I16,
            SampleType::U32,
            SampleType::I32,
            SampleType::F32,
            SampleType::F64,
        ] {
            assert_eq!(SampleType::from_name(t.name()), Some(t));
        }
        assert_eq!(SampleType::from_name("short"), Some(SampleType::I16));
        assert_eq!(SampleType::from_name("bogus"), None);
    }
}
