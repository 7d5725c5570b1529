use super::lattice::Lattice;
use nalgebra::{Point3, Vector3};

/// An axis-aligned box `[0, x] x [0, y] x [0, z]` in which molecule centers are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    extents: Vector3<f64>,
}

impl Cell {
    /// Creates a cell without validating the extents.
    ///
    /// Use [`crate::engine::validation::validate_cell`] for untrusted input.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            extents: Vector3::new(x, y, z),
        }
    }

    pub fn extents(&self) -> &Vector3<f64> {
        &self.extents
    }

    pub fn x(&self) -> f64 {
        self.extents.x
    }

    pub fn y(&self) -> f64 {
        self.extents.y
    }

    pub fn z(&self) -> f64 {
        self.extents.z
    }

    /// Length of the body diagonal.
    pub fn diagonal_length(&self) -> f64 {
        self.extents.norm()
    }

    /// The fixed site used for molecule types placed exactly once:
    /// the middle of the bottom face, `(x/2, y/2, 0)`.
    pub fn anchor(&self) -> Point3<f64> {
        Point3::new(self.extents.x / 2.0, self.extents.y / 2.0, 0.0)
    }

    pub fn has_zero_extent(&self) -> bool {
        self.extents.iter().any(|&e| e == 0.0)
    }

    /// Scales fractional coordinates in `[0, 1]` to a point inside the cell.
    pub fn point_at(&self, fractional: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.extents.component_mul(fractional))
    }

    pub fn to_lattice(&self) -> Lattice {
        Lattice::orthorhombic(self.extents.x, self.extents.y, self.extents.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_center_of_bottom_face() {
        let cell = Cell::new(10.0, 6.0, 30.0);
        assert_eq!(cell.anchor(), Point3::new(5.0, 3.0, 0.0));
    }

    #[test]
    fn point_at_scales_each_axis_independently() {
        let cell = Cell::new(10.0, 20.0, 30.0);
        let p = cell.point_at(&Vector3::new(0.5, 0.25, 1.0));
        assert_eq!(p, Point3::new(5.0, 5.0, 30.0));
    }

    #[test]
    fn zero_extent_is_detected() {
        assert!(Cell::new(10.0, 0.0, 5.0).has_zero_extent());
        assert!(!Cell::new(1.0, 1.0, 1.0).has_zero_extent());
    }

    #[test]
    fn to_lattice_is_orthorhombic() {
        let lattice = Cell::new(2.0, 3.0, 4.0).to_lattice();
        assert_eq!(lattice.diagonal(), Vector3::new(2.0, 3.0, 4.0));
        assert!((Cell::new(3.0, 4.0, 0.0).diagonal_length() - 5.0).abs() < 1e-12);
    }
}
