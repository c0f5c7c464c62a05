use crate::config::ControllerConfig;
use crate::error::ConfigError;
use crate::math::lerp;
use crate::path::PathProvider;
use crate::util::Interval;
use cgmath::prelude::*;

/// The arc length offset of the near-field tangent sample.
const NEAR_FIELD_OFFSET: f64 = 10.0;

/// Gain applied to turn sharpness when reducing throttle.
const THROTTLE_CUT_GAIN: f64 = 1.2;

/// Gain applied to turn sharpness when braking.
const BRAKE_GAIN: f64 = 1.5;

/// Slows the vehicle ahead of sharp turns by comparing the path's direction just
/// ahead of the vehicle with its direction further ahead.
#[derive(Clone, Debug)]
pub struct CurvatureBraking {
    look_ahead: f64,
    sharpness: f64,
}

/// The throttle, brake and steering look-ahead suggested by the path ahead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrakingPlan {
    /// How sharp the turn ahead is, from 0 (straight) to 1.
    pub sharpness: f64,
    /// The maximum throttle, before clamping.
    pub throttle: f64,
    /// The brake input, before clamping.
    pub brake: f64,
    /// How far ahead along the path to steer towards.
    pub look_ahead: f64,
}

impl BrakingPlan {
    /// The plan for a turn of the given sharpness.
    ///
    /// # Parameters
    /// * `sharpness` - The turn sharpness, in `[0, 1]`
    /// * `look_ahead` - The steering look-ahead range, from sharpest turn to straight
    pub fn from_sharpness(sharpness: f64, look_ahead: Interval<f64>) -> Self {
        Self {
            sharpness,
            throttle: lerp(1.0, 0.0, sharpness * THROTTLE_CUT_GAIN),
            brake: lerp(0.0, 1.0, sharpness * BRAKE_GAIN),
            look_ahead: look_ahead.lerp(1.0 - sharpness),
        }
    }

    /// Full throttle, no brake, and the longest look-ahead.
    pub fn neutral(look_ahead: Interval<f64>) -> Self {
        Self::from_sharpness(0.0, look_ahead)
    }
}

impl CurvatureBraking {
    /// Creates the braking model, or returns an error if its tunables are invalid.
    pub fn new(config: &ControllerConfig) -> Result<Self, ConfigError> {
        config.validate_braking()?;
        Ok(Self {
            look_ahead: config.braking_look_ahead,
            sharpness: config.braking_sharpness,
        })
    }

    /// Measures how sharply the path turns ahead of arc length `pos`.
    ///
    /// Returns 0 for a straight path, rising to 1 once the tangents' alignment drops
    /// to zero at the default sharpness. Degenerate paths count as straight.
    pub fn turn_sharpness(&self, path: &impl PathProvider, pos: f64) -> f64 {
        if !(path.length() > 0.0) {
            return 0.0;
        }
        let near = path.sample(pos + NEAR_FIELD_OFFSET).tan;
        let far = path.sample(pos + self.look_ahead).tan;
        if near.is_zero() || far.is_zero() {
            return 0.0;
        }
        let curvature = near.dot(far);
        (1.0 - curvature / self.sharpness).clamp(0.0, 1.0)
    }

    /// Plans the throttle, brake and steering look-ahead at arc length `pos`.
    pub fn plan(&self, path: &impl PathProvider, pos: f64, look_ahead: Interval<f64>) -> BrakingPlan {
        BrakingPlan::from_sharpness(self.turn_sharpness(path, pos), look_ahead)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point3d;
    use crate::path::TrackCurve;
    use assert_approx_eq::assert_approx_eq;

    const LOOK_AHEAD: Interval<f64> = Interval::new(600.0, 1500.0);

    #[test]
    fn straight_path_is_neutral() {
        let braking = CurvatureBraking::new(&ControllerConfig::default()).unwrap();
        let path = TrackCurve::open(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(10000.0, 0.0, 0.0),
        ]);
        let plan = braking.plan(&path, 1000.0, LOOK_AHEAD);
        assert_approx_eq!(plan.sharpness, 0.0);
        assert_approx_eq!(plan.throttle, 1.0);
        assert_approx_eq!(plan.brake, 0.0);
        assert_approx_eq!(plan.look_ahead, 1500.0);
    }

    #[test]
    fn right_angle_brakes_fully() {
        let braking = CurvatureBraking::new(&ControllerConfig::default()).unwrap();
        let path = TrackCurve::open(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2000.0, 0.0, 0.0),
            Point3d::new(2000.0, 3000.0, 0.0),
        ]);
        let plan = braking.plan(&path, 0.0, LOOK_AHEAD);
        assert_approx_eq!(plan.sharpness, 1.0, 1e-3);
        assert!(plan.throttle < 0.0);
        assert!(plan.brake > 1.0);
        assert_approx_eq!(plan.look_ahead, 600.0, 1.0);
    }

    #[test]
    fn sharpness_grows_with_turn_angle() {
        let braking = CurvatureBraking::new(&ControllerConfig::default()).unwrap();
        let sharpness = |angle: f64| {
            let (sin, cos) = angle.to_radians().sin_cos();
            let path = TrackCurve::open(vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(2000.0, 0.0, 0.0),
                Point3d::new(2000.0 + 3000.0 * cos, 3000.0 * sin, 0.0),
            ]);
            braking.turn_sharpness(&path, 0.0)
        };
        let values = [10.0, 40.0, 60.0, 80.0].map(sharpness);
        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(values[0], 0.0);
        assert!(values[3] > 0.5);
    }

    #[test]
    fn invalid_tunables_are_rejected() {
        let config = ControllerConfig {
            braking_sharpness: 0.0,
            ..Default::default()
        };
        assert!(CurvatureBraking::new(&config).is_err());
    }
}
