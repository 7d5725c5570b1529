use super::config::{MergeConfig, PlacementConfig};
use super::error::EngineError;
use super::placement::PlacementEngine;
use super::progress::{Progress, ProgressReporter};
use super::validation::{validate_atoms_object, validate_finite, validate_non_negative};
use crate::core::io::write_structure;
use crate::core::models::lattice::Lattice;
use crate::core::models::structure::{AtomicStructure, Structure};
use crate::core::models::template::MoleculeTemplate;
use nalgebra::Vector3;
use rand::Rng;
use std::path::Path;
use tracing::{debug, info};

/// Drops a randomly packed molecular layer above a slab and combines both into
/// one periodic structure.
///
/// The placement cell spans the slab's in-plane extents (`a.x`, `b.y`) and is
/// `cell_z` high. A merged result is kept until the next successful merge.
#[derive(Debug, Clone)]
pub struct SlabMerger {
    slab: Structure,
    engine: PlacementEngine,
    combined: Option<Structure>,
}

impl SlabMerger {
    /// # Errors
    ///
    /// Returns [`EngineError::TypeMismatch`] if `slab` is not a coherent atomic
    /// structure, and [`EngineError::InvalidArgument`] if the slab has no atoms or
    /// any placement parameter is invalid.
    pub fn new(
        slab: &impl AtomicStructure,
        templates: Vec<MoleculeTemplate>,
        counts: &[usize],
        config: &PlacementConfig,
    ) -> Result<Self, EngineError> {
        validate_atoms_object(slab, "slab")?;
        if slab.is_empty() {
            return Err(EngineError::InvalidArgument(
                "slab must contain at least one atom".to_string(),
            ));
        }

        let matrix = slab.lattice().matrix();
        let cell = [matrix[(0, 0)], matrix[(1, 1)], config.cell_z];
        let engine = PlacementEngine::new(templates, counts, &cell, config)?;

        Ok(Self {
            slab: Structure::from_atomic(slab),
            engine,
            combined: None,
        })
    }

    pub fn slab(&self) -> &Structure {
        &self.slab
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    /// Convenience wrapper around [`Self::merge`] with default distances and the
    /// thread-local RNG.
    pub fn merge_structures(&mut self) -> Result<(), EngineError> {
        let defaults = MergeConfig::default();
        self.merge(
            defaults.distance_from_slab,
            defaults.vacuum,
            &mut rand::thread_rng(),
        )
    }

    pub fn merge(
        &mut self,
        distance_from_slab: f64,
        vacuum: f64,
        rng: &mut impl Rng,
    ) -> Result<(), EngineError> {
        let config = MergeConfig {
            distance_from_slab,
            vacuum,
        };
        self.merge_with(&config, rng, &ProgressReporter::new())
    }

    /// Generates a new molecular layer and merges it with the slab.
    ///
    /// On failure the previously merged structure, if any, is left untouched.
    pub fn merge_with(
        &mut self,
        config: &MergeConfig,
        rng: &mut impl Rng,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        validate_finite(config.distance_from_slab, "distance_from_slab")?;
        validate_non_negative(config.vacuum, "vacuum")?;

        let mut generated = self.engine.generate_structure_with(rng, reporter)?;

        reporter.report(Progress::PhaseStart {
            name: "Slab Merge",
        });
        let slab_lattice = self.slab.lattice();
        let generated_c = generated.lattice().vector(2);
        let slab_c = slab_lattice.vector(2);

        if let Some(centroid) = generated.centroid() {
            let slab_mean = self.slab.centroid().ok_or_else(|| {
                EngineError::InvalidArgument("slab must contain at least one atom".to_string())
            })?;
            let target = slab_mean
                + generated_c / 2.0
                + slab_c / 2.0
                + Vector3::repeat(config.distance_from_slab);
            let offset = target - centroid;
            debug!(
                "Translating molecular layer by ({:.3}, {:.3}, {:.3})",
                offset.x, offset.y, offset.z
            );
            generated.translate(&offset);
        }

        let lattice = Lattice::from_vectors(
            slab_lattice.vector(0),
            slab_lattice.vector(1),
            slab_c + generated_c + Vector3::new(0.0, 0.0, config.vacuum),
        );
        let mut combined = Structure::with_capacity(
            lattice,
            self.slab.pbc(),
            self.slab.len() + generated.len(),
        );
        combined.extend_from(&self.slab);
        combined.extend_from(&generated);
        combined
            .wrap()
            .map_err(|e| EngineError::InvalidArgument(format!("cannot wrap combined structure: {}", e)))?;

        info!(
            slab_atoms = self.slab.len(),
            molecule_atoms = generated.len(),
            formula = %combined.formula(),
            "Merged molecular layer with slab."
        );
        reporter.report(Progress::PhaseFinish);
        self.combined = Some(combined);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] before the first successful merge.
    pub fn get_structure(&self) -> Result<&Structure, EngineError> {
        self.combined.as_ref().ok_or(EngineError::NotReady)
    }

    pub fn into_structure(self) -> Result<Structure, EngineError> {
        self.combined.ok_or(EngineError::NotReady)
    }

    /// Writes the merged structure; the file format follows the path's extension.
    pub fn save_structure(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let structure = self.get_structure()?;
        write_structure(path.as_ref(), structure)?;
        info!("Saved combined structure to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build::molecules::molecule;
    use crate::core::build::surface::{SurfaceKind, build_slab};
    use crate::core::io::read_structure;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn gold_slab() -> Structure {
        build_slab(SurfaceKind::Fcc100, "Au", [4, 4, 3], None, Some(0.0)).unwrap()
    }

    fn water_merger(count: usize) -> SlabMerger {
        SlabMerger::new(
            &gold_slab(),
            vec![molecule("H2O").unwrap()],
            &[count],
            &PlacementConfig {
                cell_z: 15.0,
                ..PlacementConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn structure_is_unavailable_before_merge() {
        let merger = water_merger(4);
        assert!(matches!(merger.get_structure(), Err(EngineError::NotReady)));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            merger.save_structure(dir.path().join("out.xyz")),
            Err(EngineError::NotReady)
        ));
        assert!(!dir.path().join("out.xyz").exists());
    }

    #[test]
    fn placement_cell_follows_slab_and_cell_z() {
        let slab = gold_slab();
        let merger = water_merger(4);
        let diagonal = slab.lattice().diagonal();
        let extents = merger.engine().cell().extents();
        assert_eq!(extents.x, diagonal.x);
        assert_eq!(extents.y, diagonal.y);
        assert_eq!(extents.z, 15.0);
    }

    #[test]
    fn merged_structure_contains_slab_then_molecules() {
        let slab = gold_slab();
        let mut merger = water_merger(6);
        merger
            .merge(5.0, 40.0, &mut StdRng::seed_from_u64(17))
            .unwrap();
        let combined = merger.get_structure().unwrap();

        assert_eq!(combined.len(), slab.len() + 6 * 3);
        assert!(combined.symbols()[..slab.len()].iter().all(|s| s == "Au"));
        assert_eq!(combined.pbc(), slab.pbc());

        let c = combined.lattice().vector(2);
        let expected_c = slab.lattice().vector(2).z + 15.0 + 40.0;
        assert!((c.z - expected_c).abs() < 1e-9);
        assert_eq!(combined.lattice().vector(0), slab.lattice().vector(0));
        assert_eq!(combined.lattice().vector(1), slab.lattice().vector(1));
    }

    #[test]
    fn merged_positions_lie_inside_lattice() {
        let mut merger = water_merger(8);
        merger
            .merge(5.0, 40.0, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let combined = merger.get_structure().unwrap();
        for p in combined.positions() {
            let f = combined.lattice().to_fractional(p).unwrap();
            for value in f.iter() {
                assert!(*value > -1e-6 && *value < 1.0, "fractional {:?}", f);
            }
        }
    }

    #[test]
    fn molecular_layer_is_centered_above_slab() {
        let slab = gold_slab();
        let single = MoleculeTemplate::single_atom("Xe");
        let mut merger = SlabMerger::new(
            &slab,
            vec![single],
            &[1],
            &PlacementConfig {
                cell_z: 10.0,
                ..PlacementConfig::default()
            },
        )
        .unwrap();
        merger
            .merge(2.0, 30.0, &mut StdRng::seed_from_u64(0))
            .unwrap();
        let combined = merger.get_structure().unwrap();

        // The gap is added on every axis, so the layer also shifts in-plane.
        let slab_mean = slab.centroid().unwrap();
        let expected = Point3::new(
            slab_mean.x + 2.0,
            slab_mean.y + 2.0,
            slab_mean.z + 5.0 + slab.lattice().vector(2).z / 2.0 + 2.0,
        );
        let xe = combined.positions()[slab.len()];
        assert!((xe - expected).norm() < 1e-6, "{:?} vs {:?}", xe, expected);
    }

    #[test]
    fn failed_merge_keeps_previous_result() {
        let mut merger = water_merger(3);
        let mut rng = StdRng::seed_from_u64(21);
        merger.merge(5.0, 40.0, &mut rng).unwrap();
        let before = merger.get_structure().unwrap().clone();

        assert!(matches!(
            merger.merge(5.0, -1.0, &mut rng),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(merger.get_structure().unwrap(), &before);
    }

    #[test]
    fn exhausted_placement_propagates_without_result() {
        let mut merger = SlabMerger::new(
            &gold_slab(),
            vec![MoleculeTemplate::single_atom("Ar")],
            &[2],
            &PlacementConfig {
                max_attempts: 5,
                overlap_threshold: 1.0e3,
                cell_z: 5.0,
                ..PlacementConfig::default()
            },
        )
        .unwrap();
        let result = merger.merge(5.0, 40.0, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(EngineError::PlacementExhausted { attempts: 5, .. })
        ));
        assert!(matches!(merger.get_structure(), Err(EngineError::NotReady)));
    }

    #[test]
    fn saved_structure_reads_back() {
        let mut merger = water_merger(5);
        merger
            .merge(5.0, 40.0, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.xyz");
        merger.save_structure(&path).unwrap();

        let read = read_structure(&path).unwrap();
        let combined = merger.get_structure().unwrap();
        assert_eq!(read.len(), combined.len());
        assert!((read.lattice().matrix() - combined.lattice().matrix()).norm() < 1e-6);
    }

    #[test]
    fn invalid_slab_and_parameters_are_rejected() {
        let empty = Structure::new(Lattice::orthorhombic(5.0, 5.0, 5.0), [true; 3]);
        assert!(matches!(
            SlabMerger::new(&empty, vec![], &[], &PlacementConfig::default()),
            Err(EngineError::InvalidArgument(_))
        ));

        let bad_cell_z = PlacementConfig {
            cell_z: -1.0,
            ..PlacementConfig::default()
        };
        assert!(matches!(
            SlabMerger::new(
                &gold_slab(),
                vec![molecule("CO").unwrap()],
                &[2],
                &bad_cell_z
            ),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
