use super::curve::ParametricCurve3d;
use super::{Point3d, Vector3d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A quadratic bezier curve
#[derive(Copy, Clone, Debug)]
pub struct QuadraticBezier3d {
    points: [Point3d; 3],
}

impl QuadraticBezier3d {
    pub const fn new(points: &[Point3d; 3]) -> Self {
        Self { points: *points }
    }

    /// Creates the quadratic bezier which passes through all three points,
    /// reaching `mid` halfway along.
    pub fn through(start: Point3d, mid: Point3d, end: Point3d) -> Self {
        let chord_mid = start.to_vec().lerp(end.to_vec(), 0.5);
        let control = Point3d::from_vec(mid.to_vec().lerp(chord_mid, -1.0));
        Self::new(&[start, control, end])
    }
}

impl ParametricCurve3d for QuadraticBezier3d {
    fn sample(&self, t: f64) -> Point3d {
        let t1 = 1.0 - t;
        Point3d::from_vec(
            t1 * t1 * self.points[0].to_vec()
                + 2.0 * t1 * t * self.points[1].to_vec()
                + t * t * self.points[2].to_vec(),
        )
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        let t1 = 1.0 - t;
        -2.0 * t1 * self.points[0].to_vec()
            + (2.0 - 4.0 * t) * self.points[1].to_vec()
            + 2.0 * t * self.points[2].to_vec()
    }
}
