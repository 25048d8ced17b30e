//! Layer statistics of a synthetic volume.

use crate::StatsArgs;
use anyhow::Result;
use std::sync::PoisonError;
use voxl_layer::{ImageLayer, LayerConfig};

/// Prints range, scale factor and gradient limits.
pub fn run(args: StatsArgs, config: &LayerConfig, verbose: bool) -> Result<()> {
    let image = super::synthetic_image(&args.volume)?;
    let mut layer = ImageLayer::new(image.clone(), config)?;
    layer.set_channel(args.volume.channel)?;

    let range = layer.intensity_range()?;
    let [w, h, d] = args.volume.dims;
    println!(
        "Volume:     {}x{}x{} {} ({} components)",
        w, h, d, args.volume.sample_type, args.volume.components
    );
    println!("Channel:    {}", layer.channel());
    println!("Min:        {}", range.min);
    println!("Max:        {}", range.max);
    if range.is_degenerate() {
        println!("            (constant image, every voxel maps to 0)");
    }
    println!("Scale:      {:.6}", layer.scale_factor()?);
    println!("Gradient:   {:.6}", layer.gradient_magnitude_upper_limit(false)?);
    println!("  native:   {:.6}", layer.gradient_magnitude_upper_limit(true)?);

    if verbose {
        let mapping = image
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .native_mapping();
        println!(
            "Native:     {} .. {}",
            mapping.to_native(range.min),
            mapping.to_native(range.max)
        );
    }

    if args.histogram {
        let hist = layer.histogram()?;
        let peak = hist.peak().max(1);
        let step = hist.range.span() / hist.bins() as f64;
        for (i, &count) in hist.counts.iter().enumerate() {
            let bar = "#".repeat((count * 40 / peak) as usize);
            println!("{:>12.3} {:>8} {}", hist.range.min + step * i as f64, count, bar);
        }
    }
    Ok(())
}
