//! The per-tick path following and obstacle avoidance controller.

use crate::config::ControllerConfig;
use crate::error::{ConfigError, SetupError};
use crate::math::{lerp, try_normalize, turn_towards, Vector3d};
use crate::path::PathProvider;
use crate::probe::SpatialProbe;
use crate::telemetry::{NullTelemetry, TelemetrySink};
use crate::util::Interval;
use crate::vehicle::{ControlOutput, Gear, VehicleActuationPort, VehicleState};
pub use avoidance::{AvoidanceProbe, AvoidanceScan};
pub use braking::{BrakingPlan, CurvatureBraking};
use cgmath::prelude::*;
use log::{error, trace, warn};
use rand::rngs::StdRng;
use rand::Rng;
pub use recovery::{
    RecoveryAction, RecoveryPhase, StuckRecovery, CLEARING_THROTTLE, STILLNESS_THRESHOLD,
};

mod avoidance;
mod braking;
mod recovery;

/// Steering magnitudes below this count as steering straight ahead.
const STALL_EPSILON: f64 = 0.01;

/// How much throttle is given up per unit of steering.
const STEERING_THROTTLE_CUT: f64 = 0.8;

/// The avoidance factor above which the brakes engage.
const AVOIDANCE_BRAKE_THRESHOLD: f64 = 0.6;

/// How quickly avoidance braking ramps up past the threshold.
const AVOIDANCE_BRAKE_RAMP: f64 = 2.5;

/// The strongest brake applied to avoid an obstacle.
const MAX_AVOIDANCE_BRAKE: f64 = 0.8;

/// The fraction of throttle kept when an obstacle is touching.
const MIN_AVOIDANCE_THROTTLE: f64 = 0.2;

/// The collaborators a controller is wired to.
///
/// The path and vehicle are optional so that a partially configured vehicle
/// still yields a (disabled) controller rather than failing to construct.
pub struct ControllerSetup<P, V, S> {
    /// The path to follow.
    pub path: Option<P>,
    /// The vehicle to read state from and write control inputs to.
    pub vehicle: Option<V>,
    /// The environment probed for obstacles.
    pub probe: S,
}

/// Drives a vehicle along a path, steering around obstacles, braking ahead of
/// sharp turns, and reversing out of spots it gets stuck in.
pub struct PursuitController<P, V, S, R = StdRng> {
    path: Option<P>,
    vehicle: Option<V>,
    probe: S,
    rng: R,
    setup_error: Option<SetupError>,
    look_ahead: Interval<f64>,
    braking: Option<CurvatureBraking>,
    avoidance: Option<AvoidanceProbe>,
    avoidance_strength: f64,
    recovery: StuckRecovery,
    telemetry: Box<dyn TelemetrySink>,
}

/// The intermediate results of one tick of path following.
#[derive(Clone, Copy, Debug)]
struct Pursuit {
    output: ControlOutput,
    plan: BrakingPlan,
    avoidance_factor: f64,
}

impl<P, V, S, R> PursuitController<P, V, S, R>
where
    P: PathProvider,
    V: VehicleActuationPort,
    S: SpatialProbe,
    R: Rng,
{
    /// Creates a controller.
    ///
    /// A missing path or vehicle, or an invalid path, disables the controller
    /// permanently. Invalid tunables only disable the subsystem they belong to.
    ///
    /// # Parameters
    /// * `config` - The controller's tunables
    /// * `setup` - The collaborators to wire the controller to
    /// * `rng` - The random source used to pick the steering direction when reversing
    pub fn new(config: &ControllerConfig, setup: ControllerSetup<P, V, S>, rng: R) -> Self {
        let ControllerSetup {
            path,
            vehicle,
            probe,
        } = setup;

        let setup_error = match (&path, &vehicle) {
            (None, _) => Some(SetupError::MissingPath),
            (_, None) => Some(SetupError::MissingVehicle),
            (Some(path), _) if !path.is_valid() => Some(SetupError::InvalidPath),
            _ => None,
        };
        if let Some(err) = &setup_error {
            error!("Path following disabled: {}", err);
        }

        let (look_ahead, braking) = match config.look_ahead_range() {
            Ok(range) => (range, enable("curvature braking", CurvatureBraking::new(config))),
            Err(err) => {
                warn!("Disabling curvature braking: {}", err);
                let fixed = config
                    .min_look_ahead_distance
                    .max(config.max_look_ahead_distance)
                    .max(0.0);
                (Interval::new(fixed, fixed), None)
            }
        };
        let avoidance = enable("obstacle avoidance", AvoidanceProbe::new(config));
        let (recovery, recovery_error) = StuckRecovery::new(config);
        if let Some(err) = recovery_error {
            warn!("Disabling stuck recovery: {}", err);
        }

        Self {
            path,
            vehicle,
            probe,
            rng,
            setup_error,
            look_ahead,
            braking,
            avoidance,
            avoidance_strength: config.avoidance_strength,
            recovery,
            telemetry: Box::new(NullTelemetry),
        }
    }

    /// Sends the controller's diagnostics to the given sink.
    pub fn with_telemetry(mut self, telemetry: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Box::new(telemetry);
        self
    }

    /// The reason the controller is disabled, if it is.
    pub fn setup_error(&self) -> Option<&SetupError> {
        self.setup_error.as_ref()
    }

    /// Whether the controller writes to its vehicle when ticked.
    pub fn is_enabled(&self) -> bool {
        self.setup_error.is_none()
    }

    /// Whether curvature braking is active.
    pub fn is_braking_enabled(&self) -> bool {
        self.braking.is_some()
    }

    /// Whether obstacle avoidance is active.
    pub fn is_avoidance_enabled(&self) -> bool {
        self.avoidance.is_some()
    }

    /// The stuck recovery state machine.
    pub fn recovery(&self) -> &StuckRecovery {
        &self.recovery
    }

    /// The path being followed.
    pub fn path(&self) -> Option<&P> {
        self.path.as_ref()
    }

    /// The vehicle being controlled.
    pub fn vehicle(&self) -> Option<&V> {
        self.vehicle.as_ref()
    }

    /// The vehicle being controlled, mutably.
    pub fn vehicle_mut(&mut self) -> Option<&mut V> {
        self.vehicle.as_mut()
    }

    /// The environment probed for obstacles.
    pub fn probe(&self) -> &S {
        &self.probe
    }

    /// Advances the controller by one time step and writes the resulting
    /// control inputs to the vehicle.
    ///
    /// Returns the inputs written, or `None` if the controller is disabled,
    /// in which case the vehicle is left untouched.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds. Negative or non-finite steps count as zero.
    pub fn tick(&mut self, dt: f64) -> Option<ControlOutput> {
        if self.setup_error.is_some() {
            return None;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let vehicle = self.vehicle.as_ref()?;
        let state = VehicleState::read(vehicle);
        let (steering, brake) = (vehicle.steering(), vehicle.brake());

        let action = self
            .recovery
            .update(dt, state.forward_speed, &mut self.rng);
        let (output, pursuit, shift_now) = match action {
            RecoveryAction::Pursue => {
                let pursuit = self.pursue(&state)?;
                (pursuit.output, Some(pursuit), false)
            }
            RecoveryAction::Reverse { steering, engage } => {
                let output = ControlOutput {
                    steering,
                    throttle: 1.0,
                    brake: 0.0,
                    gear: Gear::Reverse,
                };
                (output, None, engage)
            }
            RecoveryAction::Clear { engage } => {
                let output = ControlOutput {
                    steering: 0.0,
                    throttle: CLEARING_THROTTLE,
                    brake: 0.0,
                    gear: Gear::Forward,
                };
                (output, None, engage)
            }
            RecoveryAction::Release => {
                let output = ControlOutput {
                    steering,
                    throttle: 0.0,
                    brake,
                    gear: Gear::Forward,
                };
                (output, None, false)
            }
        };

        let output = output.clamped();
        trace!(
            "steering {:.3}, throttle {:.3}, brake {:.3}, gear {}",
            output.steering,
            output.throttle,
            output.brake,
            output.gear.number()
        );
        self.report(&output, pursuit.as_ref());
        output.apply(self.vehicle.as_mut()?, shift_now);
        Some(output)
    }

    /// Computes the control inputs for following the path.
    fn pursue(&self, state: &VehicleState) -> Option<Pursuit> {
        let path = self.path.as_ref()?;
        let closest = path.closest_arc_length(state.position);

        let plan = match (&self.braking, closest) {
            (Some(braking), Some(pos)) => braking.plan(path, pos, self.look_ahead),
            _ => BrakingPlan::neutral(self.look_ahead),
        };

        let direction = closest
            .and_then(|pos| {
                let target = path.sample(pos + plan.look_ahead);
                try_normalize(target.pos - state.position).or_else(|| try_normalize(target.tan))
            })
            .unwrap_or(state.forward);

        let scan = self
            .avoidance
            .as_ref()
            .map(|avoidance| avoidance.scan(&self.probe, state.position, state.forward))
            .filter(|scan| scan.detected);
        let avoidance_factor = scan.map_or(0.0, |scan| scan.intensity);
        let direction = match scan {
            Some(scan) => blend(direction, scan.safe_direction, self.avoidance_strength * avoidance_factor),
            None => direction,
        };

        let mut steering = turn_towards(state.forward, direction).clamp(-1.0, 1.0);
        if steering.abs() < STALL_EPSILON && state.forward.dot(direction) < 0.0 {
            // Facing away from the target, so commit to a full turn
            steering = if state.right.dot(direction) >= 0.0 { 1.0 } else { -1.0 };
        }

        let avoidance_brake = lerp(
            0.0,
            MAX_AVOIDANCE_BRAKE,
            ((avoidance_factor - AVOIDANCE_BRAKE_THRESHOLD) * AVOIDANCE_BRAKE_RAMP).clamp(0.0, 1.0),
        );
        let brake = plan.brake.max(avoidance_brake);

        let reactive_throttle = 1.0 - STEERING_THROTTLE_CUT * steering.abs();
        let throttle = plan.throttle.min(reactive_throttle)
            * lerp(1.0, MIN_AVOIDANCE_THROTTLE, avoidance_factor);

        Some(Pursuit {
            output: ControlOutput {
                steering,
                throttle,
                brake,
                gear: Gear::Forward,
            },
            plan,
            avoidance_factor,
        })
    }

    fn report(&mut self, output: &ControlOutput, pursuit: Option<&Pursuit>) {
        if !self.telemetry.is_enabled() {
            return;
        }
        self.telemetry.report(
            0,
            &format!(
                "Phase: {:?}, stuck timer: {:.2}",
                self.recovery.phase(),
                self.recovery.stuck_timer()
            ),
        );
        self.telemetry.report(
            1,
            &format!(
                "Steering: {:.2}, throttle: {:.2}, brake: {:.2}, gear: {}",
                output.steering,
                output.throttle,
                output.brake,
                output.gear.number()
            ),
        );
        if let Some(pursuit) = pursuit {
            self.telemetry.report(
                2,
                &format!(
                    "Turn sharpness: {:.2}, look-ahead: {:.0}, avoidance: {:.2}",
                    pursuit.plan.sharpness, pursuit.plan.look_ahead, pursuit.avoidance_factor
                ),
            );
        }
    }
}

/// Logs a subsystem's configuration error, returning the subsystem if it has none.
fn enable<T>(subsystem: &str, result: Result<T, ConfigError>) -> Option<T> {
    result
        .map_err(|err| warn!("Disabling {}: {}", subsystem, err))
        .ok()
}

/// Bends `dir` towards `towards` by `amount`, which may exceed 1.
fn blend(dir: Vector3d, towards: Vector3d, amount: f64) -> Vector3d {
    try_normalize(dir.lerp(towards, amount)).unwrap_or(dir)
}
