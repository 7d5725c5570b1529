use super::lattice::Lattice;
use nalgebra::{Point3, Rotation3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;

/// Numerical slack used when folding fractional coordinates back into `[0, 1)`.
const WRAP_EPSILON: f64 = 1e-7;

#[derive(Debug, Error, PartialEq)]
pub enum StructureError {
    #[error("Number of element symbols ({symbols}) does not match number of positions ({positions})")]
    LengthMismatch { symbols: usize, positions: usize },
    #[error("Lattice is singular (volume {volume:.3e}), positions cannot be wrapped")]
    SingularLattice { volume: f64 },
}

/// The capability every atomic structure exposes.
///
/// Anything that can report per-atom element symbols and Cartesian positions,
/// together with a lattice and periodic boundary flags, can be used as a slab or
/// as the source of a molecule template.
pub trait AtomicStructure {
    /// Element symbols, one per atom.
    fn symbols(&self) -> &[String];
    /// Cartesian positions in Angstroms, one per atom.
    fn positions(&self) -> &[Point3<f64>];
    /// The lattice (cell) of the structure.
    fn lattice(&self) -> &Lattice;
    /// Periodic boundary flags along a, b and c.
    fn pbc(&self) -> [bool; 3];

    fn len(&self) -> usize {
        self.positions().len()
    }

    fn is_empty(&self) -> bool {
        self.positions().is_empty()
    }
}

/// An ordered collection of atoms with a lattice and periodic boundary flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    symbols: Vec<String>,
    positions: Vec<Point3<f64>>,
    lattice: Lattice,
    pbc: [bool; 3],
}

impl Structure {
    /// Creates an empty structure with the given lattice and periodicity.
    pub fn new(lattice: Lattice, pbc: [bool; 3]) -> Self {
        Self {
            symbols: Vec::new(),
            positions: Vec::new(),
            lattice,
            pbc,
        }
    }

    /// Creates an empty structure with capacity reserved for `capacity` atoms.
    pub fn with_capacity(lattice: Lattice, pbc: [bool; 3], capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
            lattice,
            pbc,
        }
    }

    /// Builds a structure from parallel lists of symbols and positions.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::LengthMismatch`] if the two lists differ in length.
    pub fn from_parts(
        symbols: Vec<String>,
        positions: Vec<Point3<f64>>,
        lattice: Lattice,
        pbc: [bool; 3],
    ) -> Result<Self, StructureError> {
        if symbols.len() != positions.len() {
            return Err(StructureError::LengthMismatch {
                symbols: symbols.len(),
                positions: positions.len(),
            });
        }
        Ok(Self {
            symbols,
            positions,
            lattice,
            pbc,
        })
    }

    /// Copies any [`AtomicStructure`] into an owned `Structure`.
    pub fn from_atomic<S: AtomicStructure + ?Sized>(source: &S) -> Self {
        Self {
            symbols: source.symbols().to_vec(),
            positions: source.positions().to_vec(),
            lattice: *source.lattice(),
            pbc: source.pbc(),
        }
    }

    pub fn push(&mut self, symbol: impl Into<String>, position: Point3<f64>) {
        self.symbols.push(symbol.into());
        self.positions.push(position);
    }

    /// Appends all atoms of `other`, keeping this structure's lattice and flags.
    pub fn extend_from(&mut self, other: &impl AtomicStructure) {
        self.symbols.extend_from_slice(other.symbols());
        self.positions.extend_from_slice(other.positions());
    }

    pub fn set_lattice(&mut self, lattice: Lattice) {
        self.lattice = lattice;
    }

    pub fn set_pbc(&mut self, pbc: [bool; 3]) {
        self.pbc = pbc;
    }

    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    /// Rigidly shifts every atom by `offset`.
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    /// Rotates every atom about the coordinate origin.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>) {
        for position in &mut self.positions {
            *position = rotation * *position;
        }
    }

    /// Returns the arithmetic mean of all positions, or `None` for an empty structure.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.positions.iter().map(|p| p.coords).sum();
        Some(Point3::from(sum / self.positions.len() as f64))
    }

    /// Maps every position into the canonical image `[0, 1)` of the lattice along
    /// all three lattice directions.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::SingularLattice`] if the lattice cannot be inverted.
    pub fn wrap(&mut self) -> Result<(), StructureError> {
        let inverse = self
            .lattice
            .matrix()
            .transpose()
            .try_inverse()
            .ok_or(StructureError::SingularLattice {
                volume: self.lattice.volume(),
            })?;

        for position in &mut self.positions {
            let fractional = inverse * position.coords;
            let wrapped = fractional.map(|f| {
                let shifted = f + WRAP_EPSILON;
                shifted - shifted.floor() - WRAP_EPSILON
            });
            *position = self.lattice.to_cartesian(&wrapped);
        }
        Ok(())
    }

    /// Returns the chemical formula in Hill order (C, H, then alphabetical).
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for symbol in &self.symbols {
            *counts.entry(symbol.as_str()).or_default() += 1;
        }

        let mut ordered: Vec<(&str, usize)> = Vec::with_capacity(counts.len());
        if let Some(carbon) = counts.remove("C") {
            ordered.push(("C", carbon));
            if let Some(hydrogen) = counts.remove("H") {
                ordered.push(("H", hydrogen));
            }
        }
        ordered.extend(counts);

        ordered
            .into_iter()
            .map(|(symbol, count)| match count {
                1 => symbol.to_string(),
                n => format!("{}{}", symbol, n),
            })
            .collect()
    }
}

impl AtomicStructure for Structure {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn pbc(&self) -> [bool; 3] {
        self.pbc
    }
}
