//! voxl - color maps and intensity statistics for volumetric images
//!
//! Exports presets, samples lookup tables and runs the layer pipeline on
//! synthetic volumes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "voxl")]
#[command(author, version, about = "Color maps and intensity statistics for volumetric images")]
#[command(long_about = "
Inspect and export the color maps and statistics used to display volume layers.

Examples:
  voxl presets                              # List built-in color maps
  voxl export hot -o hot.yaml               # Save a preset as YAML
  voxl sample --map hot.yaml -n 8           # Print an 8-entry lookup table
  voxl stats -d 64x64x32 -p sphere -t u16   # Range, scale factor, gradient limit
  voxl probe -d 16x16x16 -p ramp 3,4,5 --preset jet
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Layer configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in color map presets
    #[command(visible_alias = "ls")]
    Presets,

    /// Write a preset as a YAML color map
    Export(ExportArgs),

    /// Print an evenly sampled lookup table of a color map
    #[command(visible_alias = "s")]
    Sample(SampleArgs),

    /// Compute layer statistics of a synthetic volume
    Stats(StatsArgs),

    /// Show the display color and native value of one voxel
    #[command(visible_alias = "p")]
    Probe(ProbeArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Preset name (see `voxl presets`)
    preset: String,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MapArgs {
    /// Color map YAML file
    #[arg(short, long, conflicts_with = "preset")]
    map: Option<PathBuf>,

    /// Preset name
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Args)]
struct SampleArgs {
    #[command(flatten)]
    map: MapArgs,

    /// Number of entries
    #[arg(short, default_value = "16")]
    n: usize,

    /// Print 8-bit values instead of floats
    #[arg(long)]
    bytes: bool,
}

/// Synthetic volume content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Pattern {
    /// x + y + z
    Ramp,
    /// Distance from the center
    Sphere,
    /// Deterministic pseudo-random values
    Noise,
    /// Every voxel equal to --value
    Constant,
}

#[derive(Args)]
struct VolumeArgs {
    /// Dimensions WxHxD
    #[arg(short, long, default_value = "32x32x32", value_parser = commands::parse_dims)]
    dims: [usize; 3],

    /// Content pattern
    #[arg(short, long, value_enum, default_value = "ramp")]
    pattern: Pattern,

    /// Storage type: u8, i8, u16, i16, u32, i32, f32, f64
    #[arg(short = 't', long = "type", default_value = "u16")]
    sample_type: String,

    /// Components per voxel
    #[arg(short, long, default_value = "1")]
    components: usize,

    /// Voxel spacing SXxSYxSZ
    #[arg(long, default_value = "1x1x1", value_parser = commands::parse_spacing)]
    spacing: [f64; 3],

    /// Value for the constant pattern
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    value: f64,

    /// Seed for the noise pattern
    #[arg(long, default_value = "1")]
    seed: u32,

    /// Native mapping slope
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    slope: f64,

    /// Native mapping intercept
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    intercept: f64,

    /// Displayed channel: component index, magnitude, maximum, average
    #[arg(long, default_value = "0", value_parser = commands::parse_channel)]
    channel: voxl_core::Channel,
}

#[derive(Args)]
struct StatsArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    /// Print the histogram
    #[arg(long)]
    histogram: bool,
}

#[derive(Args)]
struct ProbeArgs {
    #[command(flatten)]
    volume: VolumeArgs,

    #[command(flatten)]
    map: MapArgs,

    /// Voxel coordinate x,y,z
    #[arg(value_parser = commands::parse_voxel)]
    voxel: [usize; 3],
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Presets => commands::presets::run_list(),
        Commands::Export(args) => commands::presets::run_export(args),
        Commands::Sample(args) => commands::sample::run(args, &config),
        Commands::Stats(args) => commands::stats::run(args, &config, cli.verbose > 0),
        Commands::Probe(args) => commands::probe::run(args, &config),
    }
}
