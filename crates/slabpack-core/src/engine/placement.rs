use super::config::{PlacementConfig, RotationSampling};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::utils::sampling::{random_point_in_cell, sample_rotation};
use super::validation::{
    validate_cell, validate_non_negative, validate_positive_integer,
};
use crate::core::models::cell::Cell;
use crate::core::models::structure::{AtomicStructure, Structure};
use crate::core::models::template::MoleculeTemplate;
use nalgebra::Point3;
use rand::Rng;
use tracing::{debug, info, warn};

/// Places copies of molecule templates at random, mutually non-overlapping
/// centers inside a rectangular cell.
///
/// Centers are drawn by rejection sampling: a candidate is accepted only if its
/// distance to every previously accepted center is at least `overlap_threshold`.
/// Overlap is measured between molecule centers without periodic images.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    templates: Vec<MoleculeTemplate>,
    counts: Vec<usize>,
    /// Exclusive end index of each type in the ordered list of centers.
    cumulative_counts: Vec<usize>,
    cell: Cell,
    max_attempts: usize,
    overlap_threshold: f64,
    rotation: RotationSampling,
    positions: Vec<Point3<f64>>,
}

impl PlacementEngine {
    /// Validates all parameters and creates an engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] if `max_attempts` is zero, the
    /// overlap threshold is negative, any count is zero, `templates` and `counts`
    /// differ in length, or `cell` is not three finite non-negative extents.
    pub fn new(
        templates: Vec<MoleculeTemplate>,
        counts: &[usize],
        cell: &[f64],
        config: &PlacementConfig,
    ) -> Result<Self, EngineError> {
        validate_positive_integer(config.max_attempts, "max_attempts")?;
        validate_non_negative(config.overlap_threshold, "overlap_threshold")?;
        for (i, &count) in counts.iter().enumerate() {
            validate_positive_integer(count, &format!("num_molecules_per_type[{}]", i))?;
        }
        if templates.len() != counts.len() {
            return Err(EngineError::InvalidArgument(format!(
                "got {} molecule templates but {} molecule counts",
                templates.len(),
                counts.len()
            )));
        }
        let cell = validate_cell(cell)?;
        if cell.has_zero_extent() {
            warn!(
                "Placement cell {:?} has a zero extent; all centers collapse onto that axis.",
                cell.extents().as_slice()
            );
        }

        let cumulative_counts = counts
            .iter()
            .scan(0usize, |total, &count| {
                *total += count;
                Some(*total)
            })
            .collect();

        Ok(Self {
            templates,
            counts: counts.to_vec(),
            cumulative_counts,
            cell,
            max_attempts: config.max_attempts,
            overlap_threshold: config.overlap_threshold,
            rotation: config.rotation,
            positions: Vec::new(),
        })
    }

    pub fn templates(&self) -> &[MoleculeTemplate] {
        &self.templates
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    /// Centers accepted by the most recent call to [`Self::generate_structure`].
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn total_molecules(&self) -> usize {
        self.cumulative_counts.last().copied().unwrap_or(0)
    }

    /// Total number of atoms a generated structure will contain.
    pub fn total_atoms(&self) -> usize {
        self.templates
            .iter()
            .zip(&self.counts)
            .map(|(template, &count)| template.len() * count)
            .sum()
    }

    /// Convenience wrapper around [`Self::generate_structure`] using the thread-local RNG.
    pub fn generate(&mut self) -> Result<Structure, EngineError> {
        self.generate_structure(&mut rand::thread_rng())
    }

    pub fn generate_structure(&mut self, rng: &mut impl Rng) -> Result<Structure, EngineError> {
        self.generate_structure_with(rng, &ProgressReporter::new())
    }

    /// Generates a fresh random arrangement of all molecules.
    ///
    /// The returned structure is periodic along all three axes and its lattice is
    /// the placement cell.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlacementExhausted`] when a molecule type collects
    /// `max_attempts` rejected candidates. The accepted centers are discarded.
    pub fn generate_structure_with(
        &mut self,
        rng: &mut impl Rng,
        reporter: &ProgressReporter,
    ) -> Result<Structure, EngineError> {
        reporter.report(Progress::PhaseStart {
            name: "Molecule Placement",
        });
        self.positions.clear();
        self.positions.reserve(self.total_molecules());

        if let Err(e) = self.place_centers(rng, reporter) {
            self.positions.clear();
            reporter.report(Progress::TaskAbort {
                reason: e.to_string(),
            });
            return Err(e);
        }

        let mut structure =
            Structure::with_capacity(self.cell.to_lattice(), [true; 3], self.total_atoms());
        for (i, center) in self.positions.iter().enumerate() {
            let template = &self.templates[self.type_index_of(i)];
            let rotation = sample_rotation(self.rotation, rng);
            structure.extend_from(&template.placed(&rotation, center));
        }

        info!(
            molecules = self.positions.len(),
            atoms = structure.len(),
            "Random molecular structure generated."
        );
        reporter.report(Progress::PhaseFinish);
        Ok(structure)
    }

    fn place_centers(
        &mut self,
        rng: &mut impl Rng,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        reporter.report(Progress::TaskStart {
            total_steps: self.total_molecules() as u64,
        });

        for (type_index, &count) in self.counts.iter().enumerate() {
            if count == 1 {
                // Single molecules sit at the anchor and are exempt from the overlap check.
                self.positions.push(self.cell.anchor());
                reporter.report(Progress::TaskIncrement);
                continue;
            }

            let target = self.cumulative_counts[type_index];
            let mut attempts = 0;
            while self.positions.len() < target {
                let candidate = random_point_in_cell(&self.cell, rng);
                if self.overlaps(&candidate) {
                    attempts += 1;
                    if attempts >= self.max_attempts {
                        return Err(EngineError::PlacementExhausted {
                            molecule_index: type_index,
                            molecule_name: self.templates[type_index].name().to_string(),
                            attempts,
                        });
                    }
                } else {
                    self.positions.push(candidate);
                    reporter.report(Progress::TaskIncrement);
                }
            }
            debug!(
                molecule = self.templates[type_index].name(),
                count, rejected = attempts, "Placed molecule type."
            );
        }

        reporter.report(Progress::TaskFinish);
        Ok(())
    }

    fn overlaps(&self, candidate: &Point3<f64>) -> bool {
        self.positions
            .iter()
            .any(|p| nalgebra::distance(p, candidate) < self.overlap_threshold)
    }

    /// Molecule type of the center at `index`, by cumulative-count lookup.
    fn type_index_of(&self, index: usize) -> usize {
        self.cumulative_counts.partition_point(|&end| end <= index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build::molecules::molecule;
    use crate::core::models::lattice::Lattice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};

    fn atom(symbol: &str) -> MoleculeTemplate {
        MoleculeTemplate::single_atom(symbol)
    }

    fn config(max_attempts: usize, overlap_threshold: f64) -> PlacementConfig {
        PlacementConfig {
            max_attempts,
            overlap_threshold,
            ..PlacementConfig::default()
        }
    }

    #[test]
    fn single_molecule_is_placed_at_anchor() {
        let mut engine =
            PlacementEngine::new(vec![atom("A")], &[1], &[10.0, 10.0, 10.0], &config(10_000, 2.0))
                .unwrap();
        let structure = engine
            .generate_structure(&mut StdRng::seed_from_u64(0))
            .unwrap();

        assert_eq!(structure.len(), 1);
        assert_eq!(structure.symbols(), ["A"]);
        assert!((structure.positions()[0] - Point3::new(5.0, 5.0, 0.0)).norm() < 1e-12);
        assert_eq!(structure.pbc(), [true; 3]);
        assert_eq!(*structure.lattice(), Lattice::orthorhombic(10.0, 10.0, 10.0));
    }

    #[test]
    fn accepted_centers_respect_threshold() {
        let mut engine =
            PlacementEngine::new(vec![atom("B")], &[50], &[20.0, 20.0, 20.0], &config(10_000, 1.0))
                .unwrap();
        let structure = engine
            .generate_structure(&mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(structure.len(), 50);
        let positions = structure.positions();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(nalgebra::distance(&positions[i], &positions[j]) >= 1.0);
            }
        }
        for p in positions {
            assert!((0.0..=20.0).contains(&p.x));
            assert!((0.0..=20.0).contains(&p.y));
            assert!((0.0..=20.0).contains(&p.z));
        }
    }

    #[test]
    fn later_centers_are_checked_against_anchor() {
        let mut engine = PlacementEngine::new(
            vec![atom("C"), atom("O")],
            &[1, 30],
            &[15.0, 15.0, 15.0],
            &config(10_000, 1.5),
        )
        .unwrap();
        engine
            .generate_structure(&mut StdRng::seed_from_u64(9))
            .unwrap();

        let anchor = Point3::new(7.5, 7.5, 0.0);
        assert_eq!(engine.positions()[0], anchor);
        for p in &engine.positions()[1..] {
            assert!(nalgebra::distance(p, &anchor) >= 1.5);
        }
    }

    #[test]
    fn threshold_beyond_cell_diagonal_exhausts_attempts() {
        let mut engine =
            PlacementEngine::new(vec![atom("B")], &[2], &[1.0, 1.0, 1.0], &config(5, 10.0))
                .unwrap();
        let result = engine.generate_structure(&mut StdRng::seed_from_u64(1));

        match result {
            Err(EngineError::PlacementExhausted {
                molecule_index,
                molecule_name,
                attempts,
            }) => {
                assert_eq!(molecule_index, 0);
                assert_eq!(molecule_name, "B");
                assert_eq!(attempts, 5);
            }
            other => panic!("expected PlacementExhausted, got {:?}", other),
        }
        assert!(engine.positions().is_empty());
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let cell = [10.0, 10.0, 10.0];
        let cases = [
            PlacementEngine::new(vec![atom("A")], &[1], &cell, &config(0, 2.0)),
            PlacementEngine::new(vec![atom("A")], &[1], &cell, &config(10, -1.0)),
            PlacementEngine::new(vec![atom("A")], &[0], &cell, &config(10, 2.0)),
            PlacementEngine::new(vec![atom("A")], &[1, 2], &cell, &config(10, 2.0)),
            PlacementEngine::new(vec![atom("A")], &[1], &[10.0, 10.0], &config(10, 2.0)),
            PlacementEngine::new(vec![atom("A")], &[1], &[10.0, -1.0, 3.0], &config(10, 2.0)),
        ];
        for (i, result) in cases.into_iter().enumerate() {
            assert!(
                matches!(result, Err(EngineError::InvalidArgument(_))),
                "case {} was accepted",
                i
            );
        }
    }

    #[test]
    fn type_lookup_follows_cumulative_counts() {
        let engine = PlacementEngine::new(
            vec![atom("A"), atom("B"), atom("C")],
            &[1, 3, 2],
            &[30.0, 30.0, 30.0],
            &config(100, 0.0),
        )
        .unwrap();
        let types: Vec<usize> = (0..6).map(|i| engine.type_index_of(i)).collect();
        assert_eq!(types, vec![0, 1, 1, 1, 2, 2]);
        assert_eq!(engine.total_molecules(), 6);
    }

    #[test]
    fn atoms_are_emitted_in_template_order() {
        let water = molecule("H2O").unwrap();
        let methane = molecule("CH4").unwrap();
        let mut engine = PlacementEngine::new(
            vec![water.clone(), methane.clone()],
            &[3, 2],
            &[25.0, 25.0, 25.0],
            &config(10_000, 2.0),
        )
        .unwrap();
        let structure = engine
            .generate_structure(&mut StdRng::seed_from_u64(77))
            .unwrap();

        assert_eq!(structure.len(), 3 * water.len() + 2 * methane.len());
        assert_eq!(engine.total_atoms(), structure.len());
        let water_block = 3 * water.len();
        for chunk in structure.symbols()[..water_block].chunks(water.len()) {
            assert_eq!(chunk, water.atoms().symbols());
        }
        for chunk in structure.symbols()[water_block..].chunks(methane.len()) {
            assert_eq!(chunk, methane.atoms().symbols());
        }
    }

    #[test]
    fn repeated_calls_start_from_scratch() {
        let mut engine =
            PlacementEngine::new(vec![atom("B")], &[10], &[20.0, 20.0, 20.0], &config(10_000, 1.0))
                .unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let first = engine.generate_structure(&mut rng).unwrap();
        let second = engine.generate_structure(&mut rng).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert_eq!(engine.positions().len(), 10);
        assert_ne!(first.positions(), second.positions());
    }

    #[test]
    fn same_seed_reproduces_structure() {
        let make = || {
            PlacementEngine::new(
                vec![molecule("CO2").unwrap()],
                &[5],
                &[12.0, 12.0, 12.0],
                &config(10_000, 2.0),
            )
            .unwrap()
        };
        let a = make()
            .generate_structure(&mut StdRng::seed_from_u64(123))
            .unwrap();
        let b = make()
            .generate_structure(&mut StdRng::seed_from_u64(123))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_extent_axis_collapses_centers() {
        let mut engine =
            PlacementEngine::new(vec![atom("B")], &[4], &[10.0, 10.0, 0.0], &config(10_000, 1.0))
                .unwrap();
        engine
            .generate_structure(&mut StdRng::seed_from_u64(4))
            .unwrap();
        assert!(engine.positions().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn progress_counts_every_placed_molecule() {
        let increments = Arc::new(Mutex::new(0u64));
        let total = Arc::new(Mutex::new(0u64));
        let (inc, tot) = (increments.clone(), total.clone());
        let reporter = ProgressReporter::with_callback(Box::new(move |event| match event {
            Progress::TaskStart { total_steps } => *tot.lock().unwrap() = total_steps,
            Progress::TaskIncrement => *inc.lock().unwrap() += 1,
            _ => {}
        }));

        let mut engine = PlacementEngine::new(
            vec![atom("A"), atom("B")],
            &[1, 6],
            &[20.0, 20.0, 20.0],
            &config(10_000, 1.0),
        )
        .unwrap();
        engine
            .generate_structure_with(&mut StdRng::seed_from_u64(2), &reporter)
            .unwrap();

        assert_eq!(*total.lock().unwrap(), 7);
        assert_eq!(*increments.lock().unwrap(), 7);
    }

    #[test]
    fn exhausted_placement_aborts_the_task_instead_of_finishing_it() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        let mut engine =
            PlacementEngine::new(vec![atom("C")], &[2], &[1.0, 1.0, 1.0], &config(5, 10.0))
                .unwrap();
        assert!(engine
            .generate_structure_with(&mut StdRng::seed_from_u64(3), &reporter)
            .is_err());

        let events = events.lock().unwrap();
        assert!(!events.contains(&Progress::TaskFinish));
        assert!(!events.contains(&Progress::PhaseFinish));
        assert!(matches!(
            events.last(),
            Some(Progress::TaskAbort { reason }) if reason.contains("('C')")
        ));
    }
}
