//! Drives a vehicle along a path through a field of obstacles, steering around
//! them, braking ahead of sharp turns, and reversing out of spots it gets stuck in.

pub use cgmath;
pub use config::{ControllerConfig, ObstacleFieldConfig, TrackPilotConfig};
pub use control::{
    AvoidanceProbe, AvoidanceScan, BrakingPlan, ControllerSetup, CurvatureBraking,
    PursuitController, RecoveryAction, RecoveryPhase, StuckRecovery,
};
pub use error::{ConfigError, PlacementError, SetupError};
pub use obstacle::{place_obstacles, Obstacle, ObstacleField, Placement};
pub use path::{PathProvider, PathSample, TrackCurve};
pub use probe::{ProbeHit, SpatialProbe};
pub use simulation::{KinematicVehicle, SimController, Simulation, VehicleAttributes};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
#[cfg(feature = "debug")]
pub use telemetry::FrameRecorder;
pub use telemetry::{LogTelemetry, NullTelemetry, TelemetrySink};
pub use util::Interval;
pub use vehicle::{ControlOutput, Gear, VehicleActuationPort, VehicleState};

pub mod config;
pub mod control;
pub mod error;
pub mod math;
pub mod obstacle;
pub mod path;
pub mod probe;
mod simulation;
pub mod telemetry;
mod util;
pub mod vehicle;

new_key_type! {
    /// Unique ID of an [Obstacle].
    pub struct ObstacleId;
}
