use super::ParametricCurve3d;
use crate::math::Point3d;
use cgmath::prelude::*;

/// Projects a point onto a parametric curve.
///
/// The curve is assumed to be parameterised (approximately) by arc length.
/// The returned `t` may lie slightly outside the curve's bounds;
/// returns `None` if Newton's method fails to converge.
///
/// # Parameters
/// * `curve` - The curve to project onto
/// * `point` - The point to project
/// * `max_error` - The maximum error in `t` accepted as converged
/// * `t0` - An initial guess; when `None` the curve is coarsely sampled for one
pub fn project_point_onto_curve(
    curve: &impl ParametricCurve3d,
    point: Point3d,
    max_error: f64,
    t0: Option<f64>,
) -> Option<f64> {
    let bounds = curve.bounds();

    // Get initial guess for `t`
    let mut t = match t0 {
        Some(t0) => t0,
        None => (0..=8)
            .map(|i| bounds.lerp(i as f64 / 8.0))
            .map(|t| (t, (point - curve.sample(t)).magnitude2()))
            .min_by(|a, b| a.1.total_cmp(&b.1))?
            .0,
    };
    let (mut p, mut p_dt) = (curve.sample(t), curve.sample_dt(t));

    // Refine `t` with Newton's method
    for _ in 0..64 {
        let mag = p_dt.magnitude();
        if !(mag > 0.0) {
            return Some(t);
        }
        let error = p_dt.dot(point - p) / mag;
        if !error.is_finite() {
            return None;
        }
        t += error;
        if error.abs() < max_error || !bounds.contains(t) {
            return Some(t);
        }
        (p, p_dt) = (curve.sample(t), curve.sample_dt(t));
    }

    None
}

/// Finds a set of evenly spaced points along the given parametric curve.
///
/// The curve is assumed to be parameterised by arc length, so the points are
/// sampled at multiples of `dist` along it. Returns the points along with the
/// length of the curve they describe. If the curve's length is not a multiple
/// of `dist`, a final point is extrapolated so the last gap is also `dist` long.
pub fn equidistant_points_along_curve(
    curve: &impl ParametricCurve3d,
    dist: f64,
) -> (Vec<Point3d>, f64) {
    let bounds = curve.bounds();
    let length = bounds.length();

    if !(dist > 0.0) || !(length > 0.0) || !length.is_finite() {
        return (vec![curve.sample(bounds.min)], 0.0);
    }

    let steps = (length / dist).floor() as usize;
    let mut points = (0..=steps)
        .map(|i| curve.sample(bounds.min + i as f64 * dist))
        .collect::<Vec<_>>();
    if length - steps as f64 * dist > 0.001 * dist {
        points.push(curve.sample(bounds.min + (steps + 1) as f64 * dist));
    }

    (points, length)
}
