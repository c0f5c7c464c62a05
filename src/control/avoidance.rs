use crate::config::ControllerConfig;
use crate::error::ConfigError;
use crate::math::{yaw_vector, Point3d, Vector3d, UP};
use crate::probe::SpatialProbe;
use cgmath::Deg;

/// How far ahead of the vehicle's position the probes start.
const PROBE_FORWARD_OFFSET: f64 = 100.0;

/// How far above the vehicle's position the probes start, to keep them off the ground.
const PROBE_UP_OFFSET: f64 = 50.0;

/// Looks for obstacles ahead of the vehicle with three sphere casts:
/// one straight ahead and one angled to either side.
#[derive(Clone, Debug)]
pub struct AvoidanceProbe {
    trace_distance: f64,
    trace_radius: f64,
    half_angle: Deg<f64>,
}

/// The result of probing for obstacles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvoidanceScan {
    /// Whether any probe hit an obstacle.
    pub detected: bool,
    /// The direction of the side probe with more clearance.
    pub safe_direction: Vector3d,
    /// The shortest hit distance of the three probes.
    pub clearance: f64,
    /// How close the nearest obstacle is, from 0 (none in range) to 1 (touching).
    pub intensity: f64,
}

impl AvoidanceProbe {
    /// Creates the probe, or returns an error if its tunables are invalid.
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        config.validate_avoidance()?;
        Ok(Self {
            trace_distance: config.obstacle_trace_distance,
            trace_radius: config.obstacle_trace_radius,
            half_angle: Deg(config.avoidance_probe_angle),
        })
    }

    /// The length of each probe.
    pub fn trace_distance(&self) -> f64 {
        self.trace_distance
    }

    /// Probes ahead of the vehicle.
    ///
    /// # Parameters
    /// * `probe` - The environment to probe
    /// * `position` - The vehicle's position
    /// * `forward` - The vehicle's heading unit vector
    pub fn scan(&self, probe: &impl SpatialProbe, position: Point3d, forward: Vector3d) -> AvoidanceScan {
        let origin = position + forward * PROBE_FORWARD_OFFSET + UP * PROBE_UP_OFFSET;
        let [left, centre, right] = [-self.half_angle, Deg(0.0), self.half_angle]
            .map(|angle| yaw_vector(forward, angle));
        let hits = [left, centre, right].map(|dir| self.cast(probe, origin, dir));
        let [left_clear, centre_clear, right_clear] = hits.map(|hit| hit.unwrap_or(self.trace_distance));

        let detected = hits.iter().any(Option::is_some);
        let safe_direction = if left_clear >= right_clear { left } else { right };
        let clearance = left_clear.min(centre_clear).min(right_clear);
        let intensity = if detected {
            (1.0 - clearance / self.trace_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };

        AvoidanceScan {
            detected,
            safe_direction,
            clearance,
            intensity,
        }
    }

    /// Casts a single probe, returning the hit distance.
    fn cast(&self, probe: &impl SpatialProbe, origin: Point3d, dir: Vector3d) -> Option<f64> {
        let end = origin + dir * self.trace_distance;
        probe
            .cast_sphere(origin, end, self.trace_radius, true)
            .map(|hit| hit.distance)
            .filter(|distance| !distance.is_nan())
            .map(|distance| distance.clamp(0.0, self.trace_distance))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::{Obstacle, ObstacleField};
    use crate::probe::ProbeHit;
    use assert_approx_eq::assert_approx_eq;
    use std::cell::Cell;

    fn field(positions: &[Point3d]) -> ObstacleField {
        let mut field = ObstacleField::new();
        for &position in positions {
            field.insert(Obstacle {
                position,
                radius: 30.0,
                exclusion_radius: 75.0,
            });
        }
        field
    }

    fn scan(field: &ObstacleField) -> AvoidanceScan {
        let probe = AvoidanceProbe::new(&ControllerConfig::default()).unwrap();
        probe.scan(field, Point3d::new(0.0, 0.0, 0.0), Vector3d::unit_x())
    }

    struct CountingProbe(Cell<usize>);

    impl SpatialProbe for CountingProbe {
        fn cast_sphere(&self, _: Point3d, _: Point3d, _: f64, _: bool) -> Option<ProbeHit> {
            self.0.set(self.0.get() + 1);
            None
        }
    }

    /// Reports the same hit distance for every cast.
    struct FixedHit(f64);

    impl SpatialProbe for FixedHit {
        fn cast_sphere(&self, start: Point3d, _: Point3d, _: f64, _: bool) -> Option<ProbeHit> {
            Some(ProbeHit {
                distance: self.0,
                impact_point: start,
            })
        }
    }

    fn scan_with(hit: FixedHit) -> AvoidanceScan {
        let probe = AvoidanceProbe::new(&ControllerConfig::default()).unwrap();
        probe.scan(&hit, Point3d::new(0.0, 0.0, 0.0), Vector3d::unit_x())
    }

    #[test]
    fn nan_hits_count_as_misses() {
        let result = scan_with(FixedHit(f64::NAN));
        assert!(!result.detected);
        assert_eq!(result.intensity, 0.0);
        assert_eq!(result.clearance, 1500.0);
    }

    #[test]
    fn hit_distances_are_clamped_to_the_trace() {
        let result = scan_with(FixedHit(5000.0));
        assert!(result.detected);
        assert_eq!(result.clearance, 1500.0);
        assert_eq!(result.intensity, 0.0);

        let result = scan_with(FixedHit(-20.0));
        assert!(result.detected);
        assert_eq!(result.clearance, 0.0);
        assert_eq!(result.intensity, 1.0);
    }

    #[test]
    fn clear_road() {
        let result = scan(&ObstacleField::new());
        assert!(!result.detected);
        assert_eq!(result.intensity, 0.0);
        assert_eq!(result.clearance, 1500.0);
        // Ties go left
        assert!(result.safe_direction.y < 0.0);
    }

    #[test]
    fn casts_three_probes() {
        let probe = AvoidanceProbe::new(&ControllerConfig::default()).unwrap();
        let counter = CountingProbe(Cell::new(0));
        probe.scan(&counter, Point3d::new(0.0, 0.0, 0.0), Vector3d::unit_x());
        assert_eq!(counter.0.get(), 3);
    }

    #[test]
    fn steers_away_from_obstacle_on_the_right() {
        let result = scan(&field(&[Point3d::new(600.0, 280.0, 0.0)]));
        assert!(result.detected);
        assert!(result.safe_direction.y < 0.0);
        assert!(result.clearance < 1500.0);
    }

    #[test]
    fn steers_away_from_obstacle_on_the_left() {
        let result = scan(&field(&[Point3d::new(600.0, -280.0, 0.0)]));
        assert!(result.detected);
        assert!(result.safe_direction.y > 0.0);
        assert_approx_eq!(result.safe_direction.z, 0.0);
    }

    #[test]
    fn intensity_rises_as_obstacle_approaches() {
        let intensities = [1400.0, 1200.0, 1000.0, 800.0, 600.0]
            .map(|x| scan(&field(&[Point3d::new(x, 40.0, 0.0)])).intensity);
        for pair in intensities.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(intensities[0] > 0.0);
        assert!(intensities[4] < 1.0);
    }

    #[test]
    fn invalid_tunables_are_rejected() {
        let config = ControllerConfig {
            obstacle_trace_distance: 0.0,
            ..Default::default()
        };
        assert!(AvoidanceProbe::new(&config).is_err());
    }
}
