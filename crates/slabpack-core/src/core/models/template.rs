use super::lattice::Lattice;
use super::structure::{AtomicStructure, Structure, StructureError};
use nalgebra::{Point3, Rotation3};

/// A named, immutable molecule definition in local coordinates.
///
/// Templates are never modified in place: every placement produces a fresh copy
/// through [`MoleculeTemplate::placed`], so the relative geometry of the atoms is
/// preserved and only orientation and offset differ between copies.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeTemplate {
    name: String,
    atoms: Structure,
}

impl MoleculeTemplate {
    /// Creates a template from element symbols and local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::LengthMismatch`] if the lists differ in length.
    pub fn new(
        name: impl Into<String>,
        symbols: Vec<String>,
        positions: Vec<Point3<f64>>,
    ) -> Result<Self, StructureError> {
        Ok(Self {
            name: name.into(),
            atoms: Structure::from_parts(symbols, positions, Lattice::default(), [false; 3])?,
        })
    }

    /// Creates a template from the atoms of an existing structure.
    ///
    /// Only symbols and positions are taken over; lattice and periodicity are dropped.
    pub fn from_structure(name: impl Into<String>, source: &impl AtomicStructure) -> Self {
        let mut atoms = Structure::from_atomic(source);
        atoms.set_lattice(Lattice::default());
        atoms.set_pbc([false; 3]);
        Self {
            name: name.into(),
            atoms,
        }
    }

    /// Convenience constructor for a template consisting of a single atom at the origin.
    pub fn single_atom(symbol: &str) -> Self {
        let mut atoms = Structure::new(Lattice::default(), [false; 3]);
        atoms.push(symbol, Point3::origin());
        Self {
            name: symbol.to_string(),
            atoms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &Structure {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns a copy rotated about the local origin and then shifted to `center`.
    pub fn placed(&self, rotation: &Rotation3<f64>, center: &Point3<f64>) -> Structure {
        let mut copy = self.atoms.clone();
        copy.rotate(rotation);
        copy.translate(&center.coords);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    fn carbon_monoxide() -> MoleculeTemplate {
        MoleculeTemplate::new(
            "CO",
            vec!["C".into(), "O".into()],
            vec![Point3::new(0.0, 0.0, -0.5), Point3::new(0.0, 0.0, 0.6)],
        )
        .unwrap()
    }

    #[test]
    fn placed_preserves_internal_distances() {
        let template = carbon_monoxide();
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), PI / 3.0);
        let copy = template.placed(&rotation, &Point3::new(4.0, 5.0, 6.0));

        let original = (template.atoms().positions()[1] - template.atoms().positions()[0]).norm();
        let placed = (copy.positions()[1] - copy.positions()[0]).norm();
        assert!((original - placed).abs() < 1e-12);
    }

    #[test]
    fn placed_does_not_modify_template() {
        let template = carbon_monoxide();
        let before = template.clone();
        let _ = template.placed(&Rotation3::identity(), &Point3::new(1.0, 1.0, 1.0));
        assert_eq!(template, before);
    }

    #[test]
    fn placed_with_identity_is_pure_translation() {
        let template = carbon_monoxide();
        let copy = template.placed(&Rotation3::identity(), &Point3::new(1.0, 2.0, 3.0));
        assert_eq!(copy.positions()[0], Point3::new(1.0, 2.0, 2.5));
        assert_eq!(copy.symbols(), template.atoms().symbols());
    }

    #[test]
    fn from_structure_drops_lattice_and_periodicity() {
        let mut source = Structure::new(Lattice::orthorhombic(3.0, 3.0, 3.0), [true; 3]);
        source.push("Ar", Point3::new(1.0, 1.0, 1.0));
        let template = MoleculeTemplate::from_structure("Ar", &source);
        assert_eq!(*template.atoms().lattice(), Lattice::default());
        assert_eq!(template.atoms().pbc(), [false; 3]);
        assert_eq!(template.len(), 1);
    }

    #[test]
    fn single_atom_sits_at_origin() {
        let template = MoleculeTemplate::single_atom("A");
        assert_eq!(template.name(), "A");
        assert_eq!(template.atoms().positions(), &[Point3::origin()]);
    }
}
