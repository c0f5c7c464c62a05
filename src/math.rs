//! Mathematical structs and functions.

use cgmath::{Point3, Vector3};
pub use bezier::QuadraticBezier3d;
pub use curve::{
    equidistant_points_along_curve, project_point_onto_curve, ParametricCurve3d,
};
pub use polyline::Polyline;
pub use util::*;

mod bezier;
mod curve;
mod polyline;
mod util;

/// A 3D point
pub type Point3d = Point3<f64>;

/// A 3D vector
pub type Vector3d = Vector3<f64>;

/// The world space up direction.
pub const UP: Vector3d = Vector3d {
    x: 0.0,
    y: 0.0,
    z: 1.0,
};
