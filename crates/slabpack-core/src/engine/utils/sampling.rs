use crate::core::models::cell::Cell;
use crate::engine::config::RotationSampling;
use nalgebra::{Point3, Quaternion, Rotation3, UnitQuaternion, Vector3};
use rand::Rng;
use rand::distributions::Standard;
use std::f64::consts::TAU;

#[inline]
fn unit_interval(rng: &mut impl Rng) -> f64 {
    rng.sample(Standard)
}

/// Draws a point with each coordinate uniform in `[0, extent)` of the cell.
///
/// An axis with zero extent always yields `0.0` on that axis.
pub fn random_point_in_cell(cell: &Cell, rng: &mut impl Rng) -> Point3<f64> {
    let fractional = Vector3::new(unit_interval(rng), unit_interval(rng), unit_interval(rng));
    cell.point_at(&fractional)
}

/// Rotation whose rotation vector has components uniform in `[0, 2π)`.
pub fn rotation_vector_sample(rng: &mut impl Rng) -> Rotation3<f64> {
    let axis_angle = Vector3::new(
        unit_interval(rng) * TAU,
        unit_interval(rng) * TAU,
        unit_interval(rng) * TAU,
    );
    Rotation3::new(axis_angle)
}

/// Haar-uniform rotation from a uniformly distributed unit quaternion (Shoemake, 1992).
pub fn uniform_rotation(rng: &mut impl Rng) -> Rotation3<f64> {
    let u1 = unit_interval(rng);
    let u2 = unit_interval(rng) * TAU;
    let u3 = unit_interval(rng) * TAU;
    let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
    let quaternion = Quaternion::new(b * u3.cos(), a * u2.sin(), a * u2.cos(), b * u3.sin());
    UnitQuaternion::from_quaternion(quaternion).to_rotation_matrix()
}

pub fn sample_rotation(mode: RotationSampling, rng: &mut impl Rng) -> Rotation3<f64> {
    match mode {
        RotationSampling::RotationVector => rotation_vector_sample(rng),
        RotationSampling::Uniform => uniform_rotation(rng),
    }
}
