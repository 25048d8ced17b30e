//! Scalar channels derived from voxel components.
//!
//! A layer always displays one scalar per voxel. For scalar volumes that is
//! the stored sample; multi-component volumes either pick one component or
//! reduce all of them ([`Channel::Magnitude`], [`Channel::Maximum`],
//! [`Channel::Average`]).

use crate::volume::{Representation, Volume, VoxelIndex};
use crate::{Error, Result};

/// Scalar quantity displayed for each voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A single stored component.
    Component(usize),
    /// Euclidean norm over all components.
    Magnitude,
    /// Largest component.
    Maximum,
    /// Mean of all components.
    Average,
}

impl Default for Channel {
    fn default() -> Self {
        Self::Component(0)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component(c) => write!(f, "component {c}"),
            Self::Magnitude => f.write_str("magnitude"),
            Self::Maximum => f.write_str("maximum"),
            Self::Average => f.write_str("average"),
        }
    }
}

impl Channel {
    /// Checks that this channel can be derived from a representation.
    pub fn validate(&self, representation: Representation) -> Result<()> {
        let count = representation.components();
        match (self, representation) {
            (Self::Component(c), _) if *c >= count => Err(Error::ComponentOutOfRange {
                component: *c,
                count,
            }),
            (Self::Component(_), _) => Ok(()),
            (_, Representation::Scalar) => Err(Error::invalid_channel(
                self,
                "derived channels need a multi-component volume",
            )),
            _ => Ok(()),
        }
    }

    /// Reduces the components of one voxel to the channel value.
    pub fn reduce(&self, components: &[f64]) -> f64 {
        match self {
            Self::Component(c) => components.get(*c).copied().unwrap_or(0.0),
            Self::Magnitude => components.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Self::Maximum => components
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
            Self::Average => {
                if components.is_empty() {
                    0.0
                } else {
                    components.iter().sum::<f64>() / components.len() as f64
                }
            }
        }
    }
}

/// A volume seen through one [`Channel`].
///
/// This is what statistics are computed over and what the layer normalizes.
#[derive(Debug, Clone, Copy)]
pub struct ScalarView<'a> {
    volume: &'a Volume,
    channel: Channel,
}

impl<'a> ScalarView<'a> {
    /// Creates a view, validating the channel against the volume.
    pub fn new(volume: &'a Volume, channel: Channel) -> Result<Self> {
        channel.validate(volume.representation())?;
        Ok(Self { volume, channel })
    }

    /// View of component 0 (the stored sample of a scalar volume).
    pub fn scalar(volume: &'a Volume) -> Self {
        Self {
            volume,
            channel: Channel::Component(0),
        }
    }

    /// Underlying volume.
    #[inline]
    pub fn volume(&self) -> &'a Volume {
        self.volume
    }

    /// Displayed channel.
    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Version of the underlying buffer.
    #[inline]
    pub fn version(&self) -> u64 {
        self.volume.version()
    }

    /// Number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.volume.voxel_count()
    }

    /// Returns true if the view has no voxels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Channel value at a voxel coordinate.
    pub fn value(&self, voxel: VoxelIndex) -> Result<f64> {
        match self.channel {
            Channel::Component(c) => self.volume.read_sample(voxel, c),
            _ => Ok(self.channel.reduce(&self.volume.read_voxel(voxel)?)),
        }
    }

    /// Channel value at a flat voxel index (no bounds reporting).
    #[inline]
    pub fn value_at(&self, linear: usize) -> f64 {
        match self.channel {
            Channel::Component(c) => self.volume.sample_at(linear, c),
            _ => {
                let n = self.volume.components();
                let mut acc = [0.0f64; 8];
                if n <= acc.len() {
                    for (c, slot) in acc.iter_mut().take(n).enumerate() {
                        *slot = self.volume.sample_at(linear, c);
                    }
                    self.channel.reduce(&acc[..n])
                } else {
                    let values: Vec<f64> =
                        (0..n).map(|c| self.volume.sample_at(linear, c)).collect();
                    self.channel.reduce(&values)
                }
            }
        }
    }
}
