use super::{PathProvider, PathSample};
use crate::math::{
    equidistant_points_along_curve, project_point_onto_curve, try_normalize, ParametricCurve3d,
    Point3d, Polyline, QuadraticBezier3d, Vector3d,
};
use crate::util::Interval;
use cgmath::prelude::*;

/// The default spacing of resampled points, in world units.
const DEFAULT_STEP: f64 = 50.0;

/// The maximum error in arc length accepted when projecting onto the curve.
const PROJECTION_TOLERANCE: f64 = 0.01;

/// A track centre line, parameterised by arc length.
///
/// The control points are resampled at equal spacing and joined with
/// quadratic bezier segments, so sampling by arc length is a constant time lookup.
#[derive(Clone, Debug)]
pub struct TrackCurve {
    scale: f64,
    length: f64,
    closed: bool,
    /// The number of control points the track was built from.
    control_points: usize,
    start: Point3d,
    segments: Vec<QuadraticBezier3d>,
}

impl TrackCurve {
    /// Creates an open track, which clamps arc lengths to its ends.
    pub fn open(points: Vec<Point3d>) -> Self {
        Self::with_step(points, false, DEFAULT_STEP)
    }

    /// Creates a closed track, which joins its last control point back to the first
    /// and wraps arc lengths around.
    pub fn closed(points: Vec<Point3d>) -> Self {
        Self::with_step(points, true, DEFAULT_STEP)
    }

    /// Creates a track with the given resampling step size.
    pub fn with_step(mut points: Vec<Point3d>, closed: bool, step: f64) -> Self {
        let step = if step > 0.0 { step } else { DEFAULT_STEP };
        let control_points = points.len();
        let start = points.first().copied().unwrap_or_else(Point3d::origin);
        if closed && control_points >= 2 {
            points.push(start);
        }

        let polyline = Polyline::new(points);

        // Closed tracks use an even number of whole steps, so the last segment ends on the start
        let step = match polyline.length() {
            len if closed && len > 0.0 => len / ((0.5 * len / step).round().max(1.0) * 2.0),
            _ => step,
        };
        let (mut points, length) = equidistant_points_along_curve(&polyline, step);

        // Ensure number of points are odd so they can be evenly divided among segments
        if points.len() % 2 == 0 {
            let p1 = points[points.len() - 2];
            let p2 = points[points.len() - 1];
            points.push(Point3d::from_vec(p1.to_vec().lerp(p2.to_vec(), 2.0)));
        }

        let segments = points
            .windows(3)
            .step_by(2)
            .map(|p| QuadraticBezier3d::through(p[0], p[1], p[2]))
            .collect();

        Self {
            scale: 0.5 / step,
            length,
            closed,
            control_points,
            start,
            segments,
        }
    }

    /// Whether the track loops back onto itself.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Maps an arc length onto the track, wrapping or clamping it.
    pub fn normalize_arc_length(&self, arc_length: f64) -> f64 {
        if !arc_length.is_finite() || self.length <= 0.0 {
            0.0
        } else if self.closed {
            arc_length.rem_euclid(self.length)
        } else {
            arc_length.clamp(0.0, self.length)
        }
    }

    /// Finds the segment containing the (already normalised) arc length `pos`,
    /// along with the segment-local parameter.
    fn sample_internal(&self, pos: f64) -> Option<(&QuadraticBezier3d, f64)> {
        let last = self.segments.len().checked_sub(1)?;
        let pos = pos * self.scale;
        let idx = usize::min(pos as usize, last);
        Some((&self.segments[idx], pos - idx as f64))
    }

    /// Finds a rough arc length for the closest point, used to seed the projection.
    fn coarse_arc_length(&self, point: Point3d) -> Option<f64> {
        self.segments
            .iter()
            .enumerate()
            .flat_map(|(idx, segment)| {
                [0.0, 0.5].map(|t| ((idx as f64 + t) / self.scale, segment.sample(t)))
            })
            .map(|(pos, p)| (pos, p.distance2(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(pos, _)| pos)
    }
}

impl PathProvider for TrackCurve {
    fn length(&self) -> f64 {
        self.length
    }

    fn is_valid(&self) -> bool {
        self.control_points >= 2
    }

    fn closest_arc_length(&self, point: Point3d) -> Option<f64> {
        if self.segments.is_empty() {
            return Some(0.0);
        }
        let guess = self.coarse_arc_length(point)?;
        let pos = project_point_onto_curve(&Centreline(self), point, PROJECTION_TOLERANCE, Some(guess))?;
        Some(self.normalize_arc_length(pos))
    }

    fn sample(&self, arc_length: f64) -> PathSample {
        match self.sample_internal(self.normalize_arc_length(arc_length)) {
            Some((segment, t)) => PathSample {
                pos: segment.sample(t),
                tan: try_normalize(segment.sample_dt(t)).unwrap_or_else(Vector3d::zero),
            },
            None => PathSample {
                pos: self.start,
                tan: Vector3d::zero(),
            },
        }
    }
}

/// Views a [TrackCurve] as a parametric curve, for projecting points onto it.
struct Centreline<'a>(&'a TrackCurve);

impl ParametricCurve3d for Centreline<'_> {
    fn sample(&self, t: f64) -> Point3d {
        PathProvider::sample(self.0, t).pos
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, self.0.length)
    }

    fn sample_dt(&self, t: f64) -> Vector3d {
        PathProvider::sample(self.0, t).tan
    }
}
