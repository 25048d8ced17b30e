//! Single voxel readout.

use crate::ProbeArgs;
use anyhow::Result;
use voxl_layer::{ImageLayer, LayerConfig};

/// Prints stored value, native value and display color of one voxel.
pub fn run(args: ProbeArgs, config: &LayerConfig) -> Result<()> {
    let image = super::synthetic_image(&args.volume)?;
    let mut layer = ImageLayer::new(image, config)?;
    layer.set_channel(args.volume.channel)?;
    let map = super::load_map(&args.map, config)?;
    layer.color_map_mut().set_points(map.points().to_vec())?;

    let readout = layer.readout(args.voxel)?;
    let t = layer.normalize(readout.stored)?;
    println!("{}", readout);
    println!("  stored:     {}", readout.stored);
    println!("  normalized: {:.6}", t);
    println!("  rgba:       {}", super::format_rgba(&readout.color));
    println!("  rgba8:      {}", super::format_rgba8(&readout.color));
    Ok(())
}
