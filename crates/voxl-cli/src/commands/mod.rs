//! CLI command implementations

pub mod presets;
pub mod probe;
pub mod sample;
pub mod stats;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use voxl_colormap::{ColorMap, ColorMapPreset};
use voxl_core::{
    Channel, ImageSource, NativeMapping, Representation, SampleBuffer, SampleType, SharedImage,
    Volume,
};
use voxl_layer::LayerConfig;

use crate::{MapArgs, Pattern, VolumeArgs};

fn parse_triple<T: std::str::FromStr>(s: &str, sep: char) -> Result<[T; 3], String> {
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected three values separated by '{sep}', got '{s}'"));
    }
    let mut out = Vec::with_capacity(3);
    for p in parts {
        out.push(p.parse::<T>().map_err(|_| format!("invalid number '{p}'"))?);
    }
    out.try_into()
        .map_err(|_| format!("expected three values, got '{s}'"))
}

/// Parses `WxHxD`.
pub fn parse_dims(s: &str) -> Result<[usize; 3], String> {
    parse_triple(&s.to_ascii_lowercase(), 'x')
}

/// Parses `SXxSYxSZ`.
pub fn parse_spacing(s: &str) -> Result<[f64; 3], String> {
    parse_triple(&s.to_ascii_lowercase(), 'x')
}

/// Parses `x,y,z`.
pub fn parse_voxel(s: &str) -> Result<[usize; 3], String> {
    parse_triple(s, ',')
}

/// Parses a component index or a derived channel name.
pub fn parse_channel(s: &str) -> Result<Channel, String> {
    match s.to_ascii_lowercase().as_str() {
        "magnitude" | "mag" => Ok(Channel::Magnitude),
        "maximum" | "max" => Ok(Channel::Maximum),
        "average" | "avg" | "mean" => Ok(Channel::Average),
        other => other
            .parse::<usize>()
            .map(Channel::Component)
            .map_err(|_| format!("unknown channel '{s}'")),
    }
}

/// Loads the layer config, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<LayerConfig> {
    match path {
        Some(p) => LayerConfig::load(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Ok(LayerConfig::default()),
    }
}

/// Resolves a preset name.
pub fn preset_by_name(name: &str) -> Result<ColorMapPreset> {
    match ColorMapPreset::from_name(name) {
        Some(p) => Ok(p),
        None => bail!("Unknown preset '{}' (see `voxl presets`)", name),
    }
}

/// Color map from `--map`, `--preset` or the configured default.
pub fn load_map(args: &MapArgs, config: &LayerConfig) -> Result<ColorMap> {
    if let Some(path) = &args.map {
        return ColorMap::load(path)
            .with_context(|| format!("Failed to load color map: {}", path.display()));
    }
    let preset = match &args.preset {
        Some(name) => preset_by_name(name)?,
        None => config.preset()?,
    };
    Ok(preset.build())
}

/// Builds the volume described by the command line.
pub fn synthetic_volume(args: &VolumeArgs) -> Result<Volume> {
    let Some(sample_type) = SampleType::from_name(&args.sample_type) else {
        bail!("Unknown sample type '{}'", args.sample_type);
    };
    let representation = if args.components == 1 {
        Representation::Scalar
    } else {
        Representation::with_components(args.components)?
    };
    let [w, h, d] = args.dims;
    let (lo, hi) = sample_type.representable_range();
    // keep float patterns in a readable range
    let peak = if sample_type.is_float() { 1000.0 } else { hi.min(4095.0) };
    let center = [w as f64 / 2.0, h as f64 / 2.0, d as f64 / 2.0];
    let max_radius = center.iter().map(|c| c * c).sum::<f64>().sqrt().max(1.0);
    let max_ramp = ((w + h + d).saturating_sub(3)).max(1) as f64;

    let mut rng = StdRng::seed_from_u64(u64::from(args.seed));
    let len = w * h * d * args.components;
    let mut buffer = SampleBuffer::zeros(sample_type, len);
    let mut i = 0;
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                let base = match args.pattern {
                    Pattern::Ramp => (x + y + z) as f64 / max_ramp * peak,
                    Pattern::Sphere => {
                        let r = [x as f64 - center[0], y as f64 - center[1], z as f64 - center[2]]
                            .iter()
                            .map(|v| v * v)
                            .sum::<f64>()
                            .sqrt();
                        (1.0 - r / max_radius) * peak
                    }
                    Pattern::Noise => rng.r#gen::<f64>() * peak,
                    Pattern::Constant => args.value,
                };
                for c in 0..args.components {
                    let v = (base * (c + 1) as f64).clamp(lo, hi);
                    buffer.set(i, v);
                    i += 1;
                }
            }
        }
    }

    Ok(Volume::new(args.dims, representation, buffer)?.with_spacing(args.spacing)?)
}

/// Shared image slot holding the synthetic volume.
pub fn synthetic_image(args: &VolumeArgs) -> Result<SharedImage> {
    let volume = synthetic_volume(args)?;
    tracing::info!(
        dims = ?volume.dims(),
        sample_type = %volume.sample_type(),
        pattern = ?args.pattern,
        "synthetic volume"
    );
    Ok(ImageSource::new(volume, NativeMapping::new(args.slope, args.intercept)).shared())
}

/// Formats a color as four floats.
pub fn format_rgba(c: &[f32; 4]) -> String {
    format!("{:.4} {:.4} {:.4} {:.4}", c[0], c[1], c[2], c[3])
}

/// Formats a color as four bytes.
pub fn format_rgba8(c: &[f32; 4]) -> String {
    let b = c.map(|v| (v * 255.0).round() as u8);
    format!("{:3} {:3} {:3} {:3}", b[0], b[1], b[2], b[3])
}
