use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use slabpack::core::build::surface::SurfaceKind;
use slabpack::engine::config::{
    self as core_config, GenerationConfigBuilder, MoleculeSource, RotationSampling, SlabSource,
};
use slabpack::engine::validation::validate_positive_integer;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type", deny_unknown_fields)]
enum PartialSlabSource {
    Build {
        lattice: SurfaceKind,
        element: String,
        size: [usize; 3],
        #[serde(rename = "lattice-constant")]
        lattice_constant: Option<f64>,
        vacuum: Option<f64>,
    },
    File {
        path: PathBuf,
    },
}

impl PartialSlabSource {
    fn into_source(self, base_dir: &Path) -> SlabSource {
        match self {
            PartialSlabSource::Build {
                lattice,
                element,
                size,
                lattice_constant,
                vacuum,
            } => SlabSource::Build {
                kind: lattice,
                element,
                size,
                lattice_constant,
                vacuum,
            },
            PartialSlabSource::File { path } => SlabSource::File(resolve_relative(base_dir, path)),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialMoleculeSpec {
    name: Option<String>,
    file: Option<PathBuf>,
    count: i64,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPlacementSection {
    #[serde(rename = "max-attempts")]
    max_attempts: Option<i64>,
    #[serde(rename = "overlap-threshold")]
    overlap_threshold: Option<f64>,
    #[serde(rename = "cell-z")]
    cell_z: Option<f64>,
    rotation: Option<RotationSampling>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMergeSection {
    #[serde(rename = "distance-from-slab")]
    distance_from_slab: Option<f64>,
    vacuum: Option<f64>,
}

/// The `generate` configuration file as written by the user; every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialGenerationConfig {
    seed: Option<u64>,
    #[serde(rename = "molecule-library")]
    molecule_library: Option<PathBuf>,
    slab: Option<PartialSlabSource>,
    #[serde(default)]
    molecules: Vec<PartialMoleculeSpec>,
    placement: Option<PartialPlacementSection>,
    merge: Option<PartialMergeSection>,
    /// Directory relative file paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A fully resolved `generate` run: the library configuration plus the RNG seed.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSettings {
    pub generation: core_config::GenerationConfig,
    pub seed: Option<u64>,
}

impl PartialGenerationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Applies command-line overrides and converts the file contents into a
    /// [`GenerateSettings`]. Command-line values always win over the file.
    pub fn merge_with_cli(self, args: &GenerateArgs) -> Result<GenerateSettings> {
        let base_dir = self.base_dir;
        let placement = self.placement.unwrap_or_default();
        let merge = self.merge.unwrap_or_default();

        let slab = self
            .slab
            .ok_or_else(|| CliError::Config("`slab` section is required.".to_string()))?
            .into_source(&base_dir);
        if self.molecules.is_empty() {
            return Err(CliError::Config(
                "At least one `[[molecules]]` entry is required.".to_string(),
            ));
        }

        let mut builder = GenerationConfigBuilder::new().slab(slab);
        for (i, spec) in self.molecules.into_iter().enumerate() {
            let (source, count) = Self::merge_molecule(i, spec, &base_dir)?;
            builder = builder.molecule(source, count);
        }

        let library = args
            .molecule_library
            .clone()
            .or_else(|| self.molecule_library.map(|p| resolve_relative(&base_dir, p)));
        if let Some(path) = library {
            builder = builder.molecule_library(path);
        }

        if let Some(max_attempts) = args.max_attempts.or(placement.max_attempts) {
            validate_positive_integer(max_attempts, "max-attempts")?;
            builder = builder.max_attempts(to_usize(max_attempts, "max-attempts")?);
        }
        if let Some(threshold) = args.overlap_threshold.or(placement.overlap_threshold) {
            builder = builder.overlap_threshold(threshold);
        }
        if let Some(cell_z) = args.cell_z.or(placement.cell_z) {
            builder = builder.cell_z(cell_z);
        }
        if let Some(rotation) = args.rotation.or(placement.rotation) {
            builder = builder.rotation(rotation);
        }
        if let Some(distance) = args.distance.or(merge.distance_from_slab) {
            builder = builder.distance_from_slab(distance);
        }
        if let Some(vacuum) = args.vacuum.or(merge.vacuum) {
            builder = builder.vacuum(vacuum);
        }

        let generation = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(GenerateSettings {
            generation,
            seed: args.seed.or(self.seed),
        })
    }

    fn merge_molecule(
        index: usize,
        spec: PartialMoleculeSpec,
        base_dir: &Path,
    ) -> Result<(MoleculeSource, usize)> {
        let label = format!("molecules[{}].count", index);
        validate_positive_integer(spec.count, &label)?;
        let count = to_usize(spec.count, &label)?;

        let source = match (spec.name, spec.file) {
            (Some(name), None) => MoleculeSource::Named(name),
            (None, Some(file)) => MoleculeSource::File(resolve_relative(base_dir, file)),
            (Some(_), Some(_)) => {
                return Err(CliError::Config(format!(
                    "`molecules[{}]` sets both `name` and `file`; choose one.",
                    index
                )));
            }
            (None, None) => {
                return Err(CliError::Config(format!(
                    "`molecules[{}]` requires either `name` or `file`.",
                    index
                )));
            }
        };
        Ok((source, count))
    }
}

fn to_usize(value: i64, name: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| CliError::Argument(format!("{} is out of range: {}", name, value)))
}

fn resolve_relative(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
