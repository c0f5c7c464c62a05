//! Paths which vehicles follow and obstacles are placed along.

use crate::math::{right_of, Point3d, Vector3d};
use std::rc::Rc;
pub use track::TrackCurve;

mod track;

/// A continuous curve which can be queried by arc length.
pub trait PathProvider {
    /// The length of the path.
    fn length(&self) -> f64;

    /// Whether the path is usable, i.e. it has at least two control points.
    fn is_valid(&self) -> bool;

    /// The arc length of the point on the path closest to `point`,
    /// or `None` if the query failed.
    fn closest_arc_length(&self, point: Point3d) -> Option<f64>;

    /// Samples the path at the given arc length. Closed paths wrap around,
    /// open paths clamp to their ends.
    fn sample(&self, arc_length: f64) -> PathSample;
}

/// The result of sampling a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    /// The position on the path.
    pub pos: Point3d,
    /// The tangent unit vector of the path, or zero if the path is degenerate.
    pub tan: Vector3d,
}

impl PathSample {
    /// The unit vector to the right of the path, parallel to the ground.
    pub fn right(&self) -> Option<Vector3d> {
        right_of(self.tan)
    }

    /// Offsets the sample laterally. Positive offsets are to the right.
    pub fn lat_offset(&self, offset: f64) -> Option<Point3d> {
        self.right().map(|right| self.pos + right * offset)
    }
}

impl<T: PathProvider + ?Sized> PathProvider for &T {
    fn length(&self) -> f64 {
        (**self).length()
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }

    fn closest_arc_length(&self, point: Point3d) -> Option<f64> {
        (**self).closest_arc_length(point)
    }

    fn sample(&self, arc_length: f64) -> PathSample {
        (**self).sample(arc_length)
    }
}

impl<T: PathProvider + ?Sized> PathProvider for Rc<T> {
    fn length(&self) -> f64 {
        (**self).length()
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }

    fn closest_arc_length(&self, point: Point3d) -> Option<f64> {
        (**self).closest_arc_length(point)
    }

    fn sample(&self, arc_length: f64) -> PathSample {
        (**self).sample(arc_length)
    }
}
