use super::{Point3d, Vector3d};
use crate::util::Interval;
pub use algorithms::{equidistant_points_along_curve, project_point_onto_curve};

mod algorithms;

/// A parametric curve in 3D space.
pub trait ParametricCurve3d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point3d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;

    /// Samples the derivative of the parametric curve.
    ///
    /// The default implementation approximates the derivative by sampling
    /// two very nearby points along the curve.
    fn sample_dt(&self, t: f64) -> Vector3d {
        let delta = self.bounds().length() * 0.0001;
        let p1 = self.sample(t);
        let p2 = self.sample(t + delta);
        (p2 - p1) / delta
    }
}

impl<T: ParametricCurve3d + ?Sized> ParametricCurve3d for &T {
    fn sample(&self, t: f64) -> Point3d {
        (**self).sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        (**self).bounds()
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        (**self).sample_dt(t)
    }
}
