use crate::core::build::molecules::MoleculeLibrary;
use crate::core::build::surface::build_slab;
use crate::core::io::read_structure;
use crate::core::models::structure::{AtomicStructure, Structure};
use crate::core::models::template::MoleculeTemplate;
use crate::engine::config::{GenerationConfig, MoleculeSource, SlabSource};
use crate::engine::error::EngineError;
use crate::engine::merge::SlabMerger;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::Rng;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Slab atoms first, followed by the placed molecules in template order.
    pub structure: Structure,
    pub slab_atoms: usize,
    /// Resolved template name and count for every molecule type.
    pub molecules: Vec<(String, usize)>,
}

impl GenerationResult {
    pub fn molecule_atoms(&self) -> usize {
        self.structure.len() - self.slab_atoms
    }
}

#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    config: &GenerationConfig,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<GenerationResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    info!("Preparing slab and molecule templates.");

    let slab = load_slab(&config.slab)?;
    info!(
        atoms = slab.len(),
        formula = %slab.formula(),
        "Slab ready."
    );

    let library = match &config.molecule_library {
        Some(path) => {
            info!("Loading custom molecule library from {:?}", path);
            MoleculeLibrary::load(path)?
        }
        None => MoleculeLibrary::new(),
    };

    let mut templates = Vec::with_capacity(config.molecules.len());
    let mut counts = Vec::with_capacity(config.molecules.len());
    for spec in &config.molecules {
        let template = resolve_template(&spec.source, &library)?;
        reporter.message(format!(
            "{} x {} ({} atoms each)",
            spec.count,
            template.name(),
            template.len()
        ));
        templates.push(template);
        counts.push(spec.count);
    }
    let molecules: Vec<(String, usize)> = templates
        .iter()
        .zip(&counts)
        .map(|(t, &c)| (t.name().to_string(), c))
        .collect();
    reporter.report(Progress::PhaseFinish);

    let mut merger = SlabMerger::new(&slab, templates, &counts, &config.placement)?;
    merger.merge_with(&config.merge, rng, reporter)?;

    let structure = merger.into_structure()?;
    info!(
        total_atoms = structure.len(),
        "Generation finished."
    );
    Ok(GenerationResult {
        structure,
        slab_atoms: slab.len(),
        molecules,
    })
}

fn load_slab(source: &SlabSource) -> Result<Structure, EngineError> {
    match source {
        SlabSource::Build {
            kind,
            element,
            size,
            lattice_constant,
            vacuum,
        } => Ok(build_slab(
            *kind,
            element,
            *size,
            *lattice_constant,
            *vacuum,
        )?),
        SlabSource::File(path) => Ok(read_structure(path)?),
    }
}

fn resolve_template(
    source: &MoleculeSource,
    library: &MoleculeLibrary,
) -> Result<MoleculeTemplate, EngineError> {
    match source {
        MoleculeSource::Named(name) => library
            .resolve(name)
            .ok_or_else(|| EngineError::MoleculeNotFound(name.clone())),
        MoleculeSource::File(path) => {
            let structure = read_structure(path)?;
            Ok(MoleculeTemplate::from_structure(template_name(path), &structure))
        }
    }
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
