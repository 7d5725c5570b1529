use clap::{Args, Parser, Subcommand};
use slabpack::core::build::surface::SurfaceKind;
use slabpack::engine::config::RotationSampling;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "slabpack - Build slab + random molecular layer starting structures for surface simulations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a slab with a random, non-overlapping molecular layer above it.
    Generate(GenerateArgs),
    /// List the built-in molecule templates (and any from a custom library).
    Molecules(MoleculesArgs),
    /// Build an fcc(100) or fcc(111) slab and write it to a file.
    Slab(SlabArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to the generation configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the combined output structure (.xyz, .extxyz, .vasp, POSCAR).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Seed for the random number generator, overriding `seed` in the config file.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Placement Overrides ---
    /// Override `placement.max-attempts`.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<i64>,

    /// Override `placement.overlap-threshold` (Angstrom).
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub overlap_threshold: Option<f64>,

    /// Override `placement.cell-z` (Angstrom).
    #[arg(long, value_name = "FLOAT")]
    pub cell_z: Option<f64>,

    /// Override `placement.rotation` ('rotation-vector' or 'uniform').
    #[arg(long, value_name = "MODE")]
    pub rotation: Option<RotationSampling>,

    // --- Merge Overrides ---
    /// Override `merge.distance-from-slab` (Angstrom).
    #[arg(short, long = "distance-from-slab", value_name = "FLOAT")]
    pub distance: Option<f64>,

    /// Override `merge.vacuum` (Angstrom).
    #[arg(long, value_name = "FLOAT")]
    pub vacuum: Option<f64>,

    /// Override `molecule-library` with a TOML file of custom molecules.
    #[arg(short = 'l', long, value_name = "PATH")]
    pub molecule_library: Option<PathBuf>,
}

/// Arguments for the `molecules` subcommand.
#[derive(Args, Debug)]
pub struct MoleculesArgs {
    /// Also list the molecules defined in this TOML library.
    #[arg(short = 'l', long, value_name = "PATH")]
    pub molecule_library: Option<PathBuf>,
}

/// Arguments for the `slab` subcommand.
#[derive(Args, Debug)]
pub struct SlabArgs {
    /// Surface type ('fcc100' or 'fcc111').
    #[arg(short, long, default_value = "fcc100", value_name = "KIND")]
    pub kind: SurfaceKind,

    /// Chemical symbol of the fcc metal.
    #[arg(short, long, required = true, value_name = "SYMBOL")]
    pub element: String,

    /// Slab size as NX,NY,LAYERS.
    #[arg(
        short,
        long,
        required = true,
        value_delimiter = ',',
        value_name = "NX,NY,LAYERS"
    )]
    pub size: Vec<usize>,

    /// Lattice constant in Angstrom; defaults to the tabulated value for the element.
    #[arg(short = 'a', long, value_name = "FLOAT")]
    pub lattice_constant: Option<f64>,

    /// Vacuum above and below the slab in Angstrom.
    #[arg(long, value_name = "FLOAT")]
    pub vacuum: Option<f64>,

    /// Path for the output structure (.xyz, .extxyz, .vasp, POSCAR).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
