//! Volumetric intersection queries against the environment.

use crate::math::Point3d;
use std::rc::Rc;

/// The nearest intersection found by a sphere cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    /// The distance travelled along the cast before the sphere touched something.
    pub distance: f64,
    /// The point of contact.
    pub impact_point: Point3d,
}

/// Performs volumetric line tests against the environment.
pub trait SpatialProbe {
    /// Sweeps a sphere from `start` to `end`, returning the first hit, if any.
    ///
    /// # Parameters
    /// * `start` - The centre of the sphere at the start of the sweep
    /// * `end` - The centre of the sphere at the end of the sweep
    /// * `radius` - The radius of the sphere
    /// * `ignore_self` - Whether the probing vehicle's own geometry is excluded
    fn cast_sphere(&self, start: Point3d, end: Point3d, radius: f64, ignore_self: bool)
        -> Option<ProbeHit>;
}

impl<T: SpatialProbe + ?Sized> SpatialProbe for &T {
    fn cast_sphere(&self, start: Point3d, end: Point3d, radius: f64, ignore_self: bool) -> Option<ProbeHit> {
        (**self).cast_sphere(start, end, radius, ignore_self)
    }
}

impl<T: SpatialProbe + ?Sized> SpatialProbe for Rc<T> {
    fn cast_sphere(&self, start: Point3d, end: Point3d, radius: f64, ignore_self: bool) -> Option<ProbeHit> {
        (**self).cast_sphere(start, end, radius, ignore_self)
    }
}
