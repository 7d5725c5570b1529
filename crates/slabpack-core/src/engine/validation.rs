use super::error::EngineError;
use crate::core::models::cell::Cell;
use crate::core::models::structure::AtomicStructure;
use std::fmt::Display;

/// Integer types accepted by [`validate_positive_integer`].
pub trait Integer: Copy + PartialOrd + Display {
    const ONE: Self;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(impl Integer for $t {
            const ONE: Self = 1;
        })*
    };
}

impl_integer!(i32, i64, isize, u32, u64, usize);

/// Fails with [`EngineError::InvalidArgument`] unless `value >= 1`.
pub fn validate_positive_integer<T: Integer>(value: T, name: &str) -> Result<(), EngineError> {
    if value < T::ONE {
        return Err(EngineError::InvalidArgument(format!(
            "{} must be a positive integer, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Fails with [`EngineError::InvalidArgument`] if `value` is negative or NaN.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), EngineError> {
    if value.is_nan() || value < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Fails with [`EngineError::InvalidArgument`] unless `value` is finite.
pub fn validate_finite(value: f64, name: &str) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidArgument(format!(
            "{} must be a finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Fails with [`EngineError::TypeMismatch`] unless `obj` is a coherent atomic
/// structure: one element symbol per position, finite coordinates, finite lattice.
pub fn validate_atoms_object<S: AtomicStructure + ?Sized>(
    obj: &S,
    name: &str,
) -> Result<(), EngineError> {
    let symbols = obj.symbols().len();
    let positions = obj.positions().len();
    if symbols != positions {
        return Err(EngineError::TypeMismatch(format!(
            "{} must be an atomic structure with one element symbol per position ({} symbols, {} positions)",
            name, symbols, positions
        )));
    }
    if let Some(index) = obj
        .positions()
        .iter()
        .position(|p| p.coords.iter().any(|c| !c.is_finite()))
    {
        return Err(EngineError::TypeMismatch(format!(
            "{} has a non-finite position for atom {}",
            name, index
        )));
    }
    if !obj.lattice().is_finite() {
        return Err(EngineError::TypeMismatch(format!(
            "{} has a non-finite lattice",
            name
        )));
    }
    Ok(())
}

/// Validates cell extents and converts them into a [`Cell`].
///
/// Exactly three finite, non-negative extents are required.
pub fn validate_cell(extents: &[f64]) -> Result<Cell, EngineError> {
    let invalid = || {
        EngineError::InvalidArgument(format!(
            "cell_size must be a list of three non-negative numbers, got {:?}",
            extents
        ))
    };
    let [x, y, z] = <[f64; 3]>::try_from(extents).map_err(|_| invalid())?;
    if [x, y, z].iter().any(|e| !e.is_finite() || *e < 0.0) {
        return Err(invalid());
    }
    Ok(Cell::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lattice::Lattice;
    use crate::core::models::structure::Structure;
    use nalgebra::Point3;

    struct Broken {
        symbols: Vec<String>,
        positions: Vec<Point3<f64>>,
        lattice: Lattice,
    }

    impl AtomicStructure for Broken {
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
            [true; 3]
        }
    }

    #[test]
    fn positive_integer_accepts_one_and_above() {
        assert!(validate_positive_integer(1usize, "n").is_ok());
        assert!(validate_positive_integer(10_000i64, "n").is_ok());
    }

    #[test]
    fn positive_integer_rejects_zero_and_negative() {
        assert!(matches!(
            validate_positive_integer(0usize, "max_attempts"),
            Err(EngineError::InvalidArgument(msg)) if msg.contains("max_attempts")
        ));
        assert!(matches!(
            validate_positive_integer(-3i64, "count"),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(validate_non_negative(0.0, "overlap_threshold").is_ok());
        assert!(validate_non_negative(2.5, "overlap_threshold").is_ok());
    }

    #[test]
    fn non_negative_rejects_negative_and_nan() {
        assert!(validate_non_negative(-0.1, "x").is_err());
        assert!(validate_non_negative(f64::NAN, "x").is_err());
    }

    #[test]
    fn finite_rejects_infinities() {
        assert!(validate_finite(-4.0, "d").is_ok());
        assert!(validate_finite(f64::INFINITY, "d").is_err());
    }

    #[test]
    fn atoms_object_accepts_well_formed_structure() {
        let mut s = Structure::new(Lattice::orthorhombic(1.0, 1.0, 1.0), [true; 3]);
        s.push("Au", Point3::origin());
        assert!(validate_atoms_object(&s, "slab").is_ok());
    }

    #[test]
    fn atoms_object_rejects_mismatched_lengths() {
        let broken = Broken {
            symbols: vec!["Au".into()],
            positions: vec![],
            lattice: Lattice::default(),
        };
        assert!(matches!(
            validate_atoms_object(&broken, "slab"),
            Err(EngineError::TypeMismatch(_))
        ));
    }

    #[test]
    fn atoms_object_rejects_non_finite_data() {
        let broken = Broken {
            symbols: vec!["Au".into()],
            positions: vec![Point3::new(f64::NAN, 0.0, 0.0)],
            lattice: Lattice::default(),
        };
        assert!(matches!(
            validate_atoms_object(&broken, "slab"),
            Err(EngineError::TypeMismatch(_))
        ));

        let broken = Broken {
            symbols: vec![],
            positions: vec![],
            lattice: Lattice::orthorhombic(f64::INFINITY, 1.0, 1.0),
        };
        assert!(matches!(
            validate_atoms_object(&broken, "slab"),
            Err(EngineError::TypeMismatch(_))
        ));
    }

    #[test]
    fn cell_requires_three_non_negative_extents() {
        assert_eq!(
            validate_cell(&[10.0, 10.0, 0.0]).unwrap(),
            Cell::new(10.0, 10.0, 0.0)
        );
        assert!(matches!(
            validate_cell(&[10.0, 10.0]),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(validate_cell(&[1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(validate_cell(&[1.0, -2.0, 3.0]).is_err());
        assert!(validate_cell(&[1.0, f64::NAN, 3.0]).is_err());
    }
}
