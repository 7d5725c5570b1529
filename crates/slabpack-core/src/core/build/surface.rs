use crate::core::models::lattice::Lattice;
use crate::core::models::structure::Structure;
use nalgebra::{Point3, Vector3};
use phf::{Map, phf_map};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Experimental cubic lattice constants (Angstrom) of common fcc metals.
static FCC_LATTICE_CONSTANTS: Map<&'static str, f64> = phf_map! {
    "Al" => 4.05,
    "Ni" => 3.52,
    "Cu" => 3.61,
    "Rh" => 3.80,
    "Pd" => 3.89,
    "Ag" => 4.09,
    "Ir" => 3.84,
    "Pt" => 3.92,
    "Au" => 4.08,
    "Pb" => 4.95,
};

#[derive(Debug, Error, PartialEq)]
pub enum SurfaceError {
    #[error("No reference lattice constant for element '{0}'; specify one explicitly")]
    UnknownLatticeConstant(String),
    #[error("Lattice constant must be positive and finite, got {0}")]
    InvalidLatticeConstant(f64),
    #[error("Slab size must be at least 1 in every direction, got {0:?}")]
    InvalidSize([usize; 3]),
    #[error("Vacuum must be non-negative, got {0}")]
    NegativeVacuum(f64),
}

/// Supported surface terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// Square (100) facet of an fcc crystal, orthogonal cell.
    Fcc100,
    /// Hexagonal close-packed (111) facet of an fcc crystal, ABC stacking.
    Fcc111,
}

impl FromStr for SurfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcc100" => Ok(SurfaceKind::Fcc100),
            "fcc111" => Ok(SurfaceKind::Fcc111),
            other => Err(format!(
                "unknown surface '{}', expected 'fcc100' or 'fcc111'",
                other
            )),
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Fcc100 => write!(f, "fcc100"),
            SurfaceKind::Fcc111 => write!(f, "fcc111"),
        }
    }
}

/// Returns the tabulated fcc lattice constant for `element`, if known.
pub fn reference_lattice_constant(element: &str) -> Option<f64> {
    FCC_LATTICE_CONSTANTS.get(element).copied()
}

/// Builds a slab of `kind` with `size = [nx, ny, layers]` surface unit cells.
///
/// When `vacuum` is `None` the cell height is `layers` times the interlayer
/// spacing and the lowest layer sits at `z = 0`. With `Some(v)` the atoms are
/// centred in a cell that leaves `v` Angstrom of empty space below the lowest and
/// above the highest layer. The slab is periodic along a and b only.
pub fn build_slab(
    kind: SurfaceKind,
    element: &str,
    size: [usize; 3],
    lattice_constant: Option<f64>,
    vacuum: Option<f64>,
) -> Result<Structure, SurfaceError> {
    if size.contains(&0) {
        return Err(SurfaceError::InvalidSize(size));
    }
    let a = match lattice_constant {
        Some(a) => a,
        None => reference_lattice_constant(element)
            .ok_or_else(|| SurfaceError::UnknownLatticeConstant(element.to_string()))?,
    };
    if !(a.is_finite() && a > 0.0) {
        return Err(SurfaceError::InvalidLatticeConstant(a));
    }
    if let Some(v) = vacuum {
        if v.is_nan() || v < 0.0 {
            return Err(SurfaceError::NegativeVacuum(v));
        }
    }

    let nearest_neighbour = a / 2f64.sqrt();
    let (p1, p2, spacing) = match kind {
        SurfaceKind::Fcc100 => (
            Vector3::new(nearest_neighbour, 0.0, 0.0),
            Vector3::new(0.0, nearest_neighbour, 0.0),
            a / 2.0,
        ),
        SurfaceKind::Fcc111 => (
            Vector3::new(nearest_neighbour, 0.0, 0.0),
            Vector3::new(
                nearest_neighbour / 2.0,
                nearest_neighbour * 3f64.sqrt() / 2.0,
                0.0,
            ),
            a / 3f64.sqrt(),
        ),
    };

    let [nx, ny, layers] = size;
    let (z_offset, height) = match vacuum {
        Some(v) => (v, (layers - 1) as f64 * spacing + 2.0 * v),
        None => (0.0, layers as f64 * spacing),
    };
    let lattice = Lattice::from_vectors(
        p1 * nx as f64,
        p2 * ny as f64,
        Vector3::new(0.0, 0.0, height),
    );

    let mut slab = Structure::with_capacity(lattice, [true, true, false], nx * ny * layers);
    for layer in 0..layers {
        let shift = layer_shift(kind, layer);
        let z = z_offset + layer as f64 * spacing;
        for j in 0..ny {
            for i in 0..nx {
                let in_plane = p1 * (i as f64 + shift) + p2 * (j as f64 + shift);
                slab.push(element, Point3::new(in_plane.x, in_plane.y, z));
            }
        }
    }
    Ok(slab)
}

/// Fractional in-plane shift of a layer along both surface vectors.
fn layer_shift(kind: SurfaceKind, layer: usize) -> f64 {
    match kind {
        SurfaceKind::Fcc100 => 0.5 * (layer % 2) as f64,
        SurfaceKind::Fcc111 => (layer % 3) as f64 / 3.0,
    }
}
