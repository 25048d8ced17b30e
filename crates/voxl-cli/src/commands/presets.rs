//! Preset listing and export.

use crate::ExportArgs;
use anyhow::{Context, Result};
use voxl_colormap::ColorMapPreset;

/// Prints every preset with its number of control points.
pub fn run_list() -> Result<()> {
    for preset in ColorMapPreset::all() {
        let points = preset.control_points();
        println!("{:<16} {} points", preset.name(), points.len());
    }
    Ok(())
}

/// Writes a preset as YAML to a file or stdout.
pub fn run_export(args: ExportArgs) -> Result<()> {
    let preset = super::preset_by_name(&args.preset)?;
    let map = preset.build();
    match &args.output {
        Some(path) => {
            map.save(path)
                .with_context(|| format!("Failed to save: {}", path.display()))?;
            println!("Wrote {} to {}", preset, path.display());
        }
        None => print!("{}", map.to_yaml()?),
    }
    Ok(())
}
