use super::{Vector3d, UP};
use cgmath::prelude::*;
use cgmath::{Quaternion, Rad};

/// Squared magnitudes below this are treated as zero-length vectors.
const DEGENERATE_MAGNITUDE2: f64 = 1e-12;

/// Linearly interpolates between `a` and `b`. `t` is not clamped.
#[inline(always)]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Normalizes a vector, or returns `None` if it has (almost) zero length.
pub fn try_normalize(vec: Vector3d) -> Option<Vector3d> {
    let mag2 = vec.magnitude2();
    if mag2.is_finite() && mag2 > DEGENERATE_MAGNITUDE2 {
        Some(vec / mag2.sqrt())
    } else {
        None
    }
}

/// The unit vector pointing to the right of `dir`, parallel to the ground.
pub fn right_of(dir: Vector3d) -> Option<Vector3d> {
    try_normalize(UP.cross(dir))
}

/// Rotates a vector about the world up axis.
/// Positive angles rotate towards the right.
pub fn yaw_vector(vec: Vector3d, angle: impl Into<Rad<f64>>) -> Vector3d {
    Quaternion::from_axis_angle(UP, angle).rotate_vector(vec)
}

/// The signed turn from `forward` towards `dir`, positive when `dir` lies to the right.
pub fn turn_towards(forward: Vector3d, dir: Vector3d) -> f64 {
    forward.cross(dir).z
}
