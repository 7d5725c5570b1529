use crate::core::build::surface::SurfaceKind;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 2.0;
pub const DEFAULT_CELL_Z: f64 = 30.0;
pub const DEFAULT_DISTANCE_FROM_SLAB: f64 = 5.0;
pub const DEFAULT_VACUUM: f64 = 40.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// How a random orientation is drawn for every placed molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationSampling {
    /// Rotation vector with each component drawn from `U[0, 2π)`.
    ///
    /// This does not sample orientations uniformly; it is the historical
    /// behavior and remains the default so that generated ensembles match.
    #[default]
    RotationVector,
    /// Haar-uniform random rotations (uniform random unit quaternions).
    Uniform,
}

impl FromStr for RotationSampling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rotation-vector" | "rotvec" => Ok(RotationSampling::RotationVector),
            "uniform" | "haar" => Ok(RotationSampling::Uniform),
            other => Err(format!(
                "unknown rotation sampling '{}', expected 'rotation-vector' or 'uniform'",
                other
            )),
        }
    }
}

impl fmt::Display for RotationSampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationSampling::RotationVector => write!(f, "rotation-vector"),
            RotationSampling::Uniform => write!(f, "uniform"),
        }
    }
}

/// Parameters of the random placement step.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Rejected draws allowed per molecule type before giving up.
    pub max_attempts: usize,
    /// Minimum center-to-center distance between placed molecules (Angstrom).
    pub overlap_threshold: f64,
    /// Height of the placement cell when it is derived from a slab (Angstrom).
    pub cell_z: f64,
    pub rotation: RotationSampling,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            cell_z: DEFAULT_CELL_Z,
            rotation: RotationSampling::default(),
        }
    }
}

#[derive(Default)]
pub struct PlacementConfigBuilder {
    max_attempts: Option<usize>,
    overlap_threshold: Option<f64>,
    cell_z: Option<f64>,
    rotation: Option<RotationSampling>,
}

impl PlacementConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = Some(threshold);
        self
    }
    pub fn cell_z(mut self, z: f64) -> Self {
        self.cell_z = Some(z);
        self
    }
    pub fn rotation(mut self, rotation: RotationSampling) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn build(self) -> PlacementConfig {
        PlacementConfig {
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            overlap_threshold: self.overlap_threshold.unwrap_or(DEFAULT_OVERLAP_THRESHOLD),
            cell_z: self.cell_z.unwrap_or(DEFAULT_CELL_Z),
            rotation: self.rotation.unwrap_or_default(),
        }
    }
}

/// Parameters of the slab merge step.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Extra offset of the molecular block, added to each cartesian axis (Angstrom).
    pub distance_from_slab: f64,
    /// Empty space appended to the combined cell along z (Angstrom).
    pub vacuum: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            distance_from_slab: DEFAULT_DISTANCE_FROM_SLAB,
            vacuum: DEFAULT_VACUUM,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlabSource {
    Build {
        kind: SurfaceKind,
        element: String,
        size: [usize; 3],
        lattice_constant: Option<f64>,
        vacuum: Option<f64>,
    },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoleculeSource {
    /// A built-in or library molecule, by formula name.
    Named(String),
    /// A structure file whose atoms form the template.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeSpec {
    pub source: MoleculeSource,
    pub count: usize,
}

/// Everything needed for one complete generate-and-merge run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub slab: SlabSource,
    pub molecules: Vec<MoleculeSpec>,
    pub molecule_library: Option<PathBuf>,
    pub placement: PlacementConfig,
    pub merge: MergeConfig,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    slab: Option<SlabSource>,
    molecules: Vec<MoleculeSpec>,
    molecule_library: Option<PathBuf>,
    max_attempts: Option<usize>,
    overlap_threshold: Option<f64>,
    cell_z: Option<f64>,
    rotation: Option<RotationSampling>,
    distance_from_slab: Option<f64>,
    vacuum: Option<f64>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slab(mut self, source: SlabSource) -> Self {
        self.slab = Some(source);
        self
    }
    pub fn molecule(mut self, source: MoleculeSource, count: usize) -> Self {
        self.molecules.push(MoleculeSpec { source, count });
        self
    }
    pub fn molecule_library(mut self, path: PathBuf) -> Self {
        self.molecule_library = Some(path);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = Some(threshold);
        self
    }
    pub fn cell_z(mut self, z: f64) -> Self {
        self.cell_z = Some(z);
        self
    }
    pub fn rotation(mut self, rotation: RotationSampling) -> Self {
        self.rotation = Some(rotation);
        self
    }
    pub fn distance_from_slab(mut self, distance: f64) -> Self {
        self.distance_from_slab = Some(distance);
        self
    }
    pub fn vacuum(mut self, vacuum: f64) -> Self {
        self.vacuum = Some(vacuum);
        self
    }

    /// Builds the configuration, filling unset numeric parameters with defaults.
    ///
    /// Value ranges are not checked here; the engine validates them on construction.
    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let slab = self.slab.ok_or(ConfigError::MissingParameter("slab"))?;
        if self.molecules.is_empty() {
            return Err(ConfigError::MissingParameter("molecules"));
        }
        let placement = PlacementConfigBuilder {
            max_attempts: self.max_attempts,
            overlap_threshold: self.overlap_threshold,
            cell_z: self.cell_z,
            rotation: self.rotation,
        }
        .build();
        let merge = MergeConfig {
            distance_from_slab: self
                .distance_from_slab
                .unwrap_or(DEFAULT_DISTANCE_FROM_SLAB),
            vacuum: self.vacuum.unwrap_or(DEFAULT_VACUUM),
        };
        Ok(GenerationConfig {
            slab,
            molecules: self.molecules,
            molecule_library: self.molecule_library,
            placement,
            merge,
        })
    }
}
