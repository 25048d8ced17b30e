//! Lookup table sampling.

use crate::SampleArgs;
use anyhow::{bail, Result};
use voxl_colormap::LutCache;
use voxl_layer::LayerConfig;

/// Prints `n` evenly spaced colors of the selected map.
pub fn run(args: SampleArgs, config: &LayerConfig) -> Result<()> {
    if args.n < 2 {
        bail!("Need at least 2 entries, got {}", args.n);
    }
    let map = super::load_map(&args.map, config)?;
    let mut lut = LutCache::new();
    let table = lut.get(&map, args.n)?;
    let last = (args.n - 1) as f64;
    for (i, c) in table.iter().enumerate() {
        let rgba = if args.bytes {
            super::format_rgba8(c)
        } else {
            super::format_rgba(c)
        };
        println!("{:.4}  {}", i as f64 / last, rgba);
    }
    Ok(())
}
