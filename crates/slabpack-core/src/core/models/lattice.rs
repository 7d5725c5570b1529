use nalgebra::{Matrix3, Point3, Vector3};

/// The three lattice vectors of a periodic cell, stored as matrix rows.
///
/// Row `i` of the matrix is the `i`-th lattice vector in Cartesian coordinates
/// (Angstroms). A lattice of all zeros is used for non-periodic objects such as
/// isolated molecule templates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
}

impl Default for Lattice {
    fn default() -> Self {
        Self {
            matrix: Matrix3::zeros(),
        }
    }
}

impl Lattice {
    /// Creates a lattice from its three vectors `a`, `b` and `c`.
    pub fn from_vectors(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix3::from_rows(&[a.transpose(), b.transpose(), c.transpose()]),
        }
    }

    /// Creates an orthorhombic lattice with the given edge lengths along x, y and z.
    pub fn orthorhombic(x: f64, y: f64, z: f64) -> Self {
        Self {
            matrix: Matrix3::from_diagonal(&Vector3::new(x, y, z)),
        }
    }

    /// Returns the `index`-th lattice vector (0 = a, 1 = b, 2 = c).
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than 2.
    pub fn vector(&self, index: usize) -> Vector3<f64> {
        self.matrix.row(index).transpose()
    }

    /// Returns the raw matrix with lattice vectors as rows.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Returns the diagonal elements `(a_x, b_y, c_z)`.
    ///
    /// For orthorhombic lattices these are the edge lengths of the box.
    pub fn diagonal(&self) -> Vector3<f64> {
        self.matrix.diagonal()
    }

    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    /// Converts a Cartesian position to fractional coordinates.
    ///
    /// Returns `None` when the lattice is singular.
    pub fn to_fractional(&self, position: &Point3<f64>) -> Option<Vector3<f64>> {
        let inverse = self.matrix.transpose().try_inverse()?;
        Some(inverse * position.coords)
    }

    /// Converts fractional coordinates to a Cartesian position.
    pub fn to_cartesian(&self, fractional: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.matrix.transpose() * fractional)
    }
}
