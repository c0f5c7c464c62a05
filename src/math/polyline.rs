use super::curve::ParametricCurve3d;
use super::{Point3d, Vector3d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A piecewise linear curve through a sequence of control points,
/// parameterised by arc length.
#[derive(Clone, Debug)]
pub struct Polyline {
    points: Vec<Point3d>,
    /// The arc length at each point.
    dists: Vec<f64>,
}

impl Polyline {
    /// Creates a polyline. Consecutive duplicate points are dropped.
    pub fn new(mut points: Vec<Point3d>) -> Self {
        points.dedup_by(|a, b| a.distance2(*b) == 0.0);
        let mut dists = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += point.distance(points[i - 1]);
            }
            dists.push(total);
        }
        Self { points, dists }
    }

    /// The total length of the polyline.
    pub fn length(&self) -> f64 {
        self.dists.last().copied().unwrap_or(0.0)
    }

    /// Finds the segment containing the arc length `t`,
    /// returning the segment's start index and its local parameter.
    fn locate(&self, t: f64) -> Option<(usize, f64)> {
        if self.points.len() < 2 {
            return None;
        }
        let idx = self.dists.partition_point(|d| *d <= t);
        let idx = idx.clamp(1, self.points.len() - 1) - 1;
        let seg_len = self.dists[idx + 1] - self.dists[idx];
        Some((idx, (t - self.dists[idx]) / seg_len))
    }
}

impl ParametricCurve3d for Polyline {
    fn sample(&self, t: f64) -> Point3d {
        match self.locate(t) {
            Some((idx, u)) => {
                let (a, b) = (self.points[idx], self.points[idx + 1]);
                a + (b - a) * u
            }
            None => self.points.first().copied().unwrap_or_else(Point3d::origin),
        }
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.length())
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        match self.locate(t) {
            Some((idx, _)) => (self.points[idx + 1] - self.points[idx]).normalize(),
            None => Vector3d::zero(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn polyline_is_arclength_parameterised() {
        let line = Polyline::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(300.0, 0.0, 0.0),
            Point3d::new(300.0, 400.0, 0.0),
        ]);
        assert_approx_eq!(line.length(), 700.0);
        assert_approx_eq!(line.sample(150.0).x, 150.0);
        assert_approx_eq!(line.sample(500.0).y, 200.0);
        assert_approx_eq!(line.sample_dt(500.0).y, 1.0);
        assert_approx_eq!(line.sample(900.0).y, 600.0);
    }

    #[test]
    fn duplicate_points_are_dropped() {
        let line = Polyline::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(100.0, 0.0, 0.0),
        ]);
        assert_approx_eq!(line.length(), 100.0);
        assert_approx_eq!(line.sample_dt(0.0).x, 1.0);
    }
}
