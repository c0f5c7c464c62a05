//! A closed-loop harness which drives a [KinematicVehicle] around a track with a
//! [PursuitController].

use crate::config::ControllerConfig;
use crate::control::{ControllerSetup, PursuitController};
use crate::obstacle::ObstacleField;
use crate::path::{PathProvider, TrackCurve};
use crate::telemetry::TelemetrySink;
use crate::vehicle::{ControlOutput, VehicleActuationPort};
use rand::rngs::StdRng;
use rand::Rng;
use std::rc::Rc;
pub use vehicle::{KinematicVehicle, VehicleAttributes};

mod vehicle;

/// The controller driving a [Simulation]'s vehicle.
pub type SimController<R = StdRng> = PursuitController<Rc<TrackCurve>, KinematicVehicle, Rc<ObstacleField>, R>;

/// A vehicle following a track through a field of obstacles.
pub struct Simulation<R = StdRng> {
    /// The track being followed.
    track: Rc<TrackCurve>,
    /// The obstacles along the track.
    obstacles: Rc<ObstacleField>,
    /// The controller, which owns the vehicle.
    controller: SimController<R>,
    /// The current frame of simulation.
    frame: usize,
    /// The simulated time in s.
    time: f64,
}

impl<R: Rng> Simulation<R> {
    /// Creates a new simulation.
    ///
    /// # Parameters
    /// * `config` - The controller's tunables
    /// * `track` - The track to follow
    /// * `obstacles` - The obstacles along the track
    /// * `vehicle` - The vehicle to drive
    /// * `rng` - The controller's random source
    pub fn new(
        config: &ControllerConfig,
        track: TrackCurve,
        obstacles: ObstacleField,
        vehicle: KinematicVehicle,
        rng: R,
    ) -> Self {
        let track = Rc::new(track);
        let obstacles = Rc::new(obstacles);
        let setup = ControllerSetup {
            path: Some(track.clone()),
            vehicle: Some(vehicle),
            probe: obstacles.clone(),
        };
        Self {
            track,
            obstacles,
            controller: PursuitController::new(config, setup, rng),
            frame: 0,
            time: 0.0,
        }
    }

    /// Sends the controller's diagnostics to the given sink.
    pub fn with_telemetry(mut self, telemetry: impl TelemetrySink + 'static) -> Self {
        self.controller = self.controller.with_telemetry(telemetry);
        self
    }

    /// Advances the simulation by `dt` seconds, returning the control inputs applied.
    pub fn step(&mut self, dt: f64) -> Option<ControlOutput> {
        let output = self.controller.tick(dt);
        if let Some(vehicle) = self.controller.vehicle_mut() {
            vehicle.integrate(dt, &self.obstacles);
        }
        self.frame += 1;
        self.time += dt;
        output
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The track being followed.
    pub fn track(&self) -> &TrackCurve {
        &self.track
    }

    /// The obstacles along the track.
    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// The controller driving the vehicle.
    pub fn controller(&self) -> &SimController<R> {
        &self.controller
    }

    /// The vehicle, if the controller still owns one.
    pub fn vehicle(&self) -> Option<&KinematicVehicle> {
        self.controller.vehicle()
    }

    /// How far along the track the vehicle is, from 0 to 1.
    pub fn progress(&self) -> Option<f64> {
        let length = self.track.length();
        if !(length > 0.0) {
            return None;
        }
        let vehicle = self.vehicle()?;
        let pos = self.track.closest_arc_length(vehicle.position())?;
        Some(pos / length)
    }
}
