use crate::math::{right_of, try_normalize, yaw_vector, Point3d, Vector3d};
use crate::obstacle::ObstacleField;
use crate::path::PathProvider;
use crate::vehicle::{Gear, VehicleActuationPort};
use cgmath::prelude::*;
use cgmath::Deg;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The time taken to change gear when the change is not immediate, in s.
const SHIFT_TIME: f64 = 0.5;

/// The attributes of a [KinematicVehicle].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct VehicleAttributes {
    /// Distance between the front and rear axles.
    pub wheel_base: f64,
    /// The steering angle of the front wheels at full lock, in degrees.
    pub max_steer_angle: f64,
    /// The acceleration at full throttle.
    pub max_acceleration: f64,
    /// The deceleration at full brake.
    pub brake_deceleration: f64,
    /// The top speed in either direction.
    pub max_speed: f64,
    /// The radius of the vehicle's collision sphere.
    pub radius: f64,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            wheel_base: 270.0,
            max_steer_angle: 35.0,
            max_acceleration: 600.0,
            brake_deceleration: 1500.0,
            max_speed: 2500.0,
            radius: 120.0,
        }
    }
}

/// A vehicle whose rear axle trails its steered front axle, with no tyre slip.
#[derive(Clone, Debug)]
pub struct KinematicVehicle {
    attributes: VehicleAttributes,
    /// The world space position of the centre of the vehicle.
    position: Point3d,
    /// The heading unit vector.
    forward: Vector3d,
    /// The signed speed along `forward`.
    speed: f64,
    steering: f64,
    throttle: f64,
    brake: f64,
    gear: Gear,
    /// A gear change in progress, with the time left until it completes.
    shift: Option<(Gear, f64)>,
    /// The number of steps in which the vehicle was stopped by an obstacle.
    collisions: usize,
}

impl KinematicVehicle {
    /// Creates a stationary vehicle.
    pub fn new(attributes: VehicleAttributes, position: Point3d, forward: Vector3d) -> Self {
        Self {
            attributes,
            position,
            forward: try_normalize(forward).unwrap_or_else(Vector3d::unit_x),
            speed: 0.0,
            steering: 0.0,
            throttle: 0.0,
            brake: 0.0,
            gear: Gear::Forward,
            shift: None,
            collisions: 0,
        }
    }

    /// Creates a stationary vehicle on a path, facing along it.
    pub fn on_path(attributes: VehicleAttributes, path: &impl PathProvider, arc_length: f64) -> Self {
        let sample = path.sample(arc_length);
        Self::new(attributes, sample.pos, sample.tan)
    }

    pub fn attributes(&self) -> &VehicleAttributes {
        &self.attributes
    }

    /// The engaged gear.
    pub fn gear(&self) -> Gear {
        self.gear
    }

    /// The number of steps in which the vehicle was stopped by an obstacle.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Advances the vehicle by `dt` seconds, stopping it dead
    /// if it would run into an obstacle.
    pub fn integrate(&mut self, dt: f64, obstacles: &ObstacleField) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }

        if let Some((gear, time)) = self.shift {
            if time <= dt {
                self.gear = gear;
                self.shift = None;
            } else {
                self.shift = Some((gear, time - dt));
            }
        }

        // Longitudinal dynamics
        let attr = &self.attributes;
        let drive = if self.shift.is_some() { 0.0 } else { self.throttle };
        let mut speed = self.speed + drive * attr.max_acceleration * self.gear.direction() * dt;
        let braking = self.brake * attr.brake_deceleration * dt;
        speed = speed.signum() * (speed.abs() - braking).max(0.0);
        speed = speed.clamp(-attr.max_speed, attr.max_speed);

        // The front axle moves in the direction of the wheels, dragging the rear axle behind it
        let half_wb = 0.5 * attr.wheel_base;
        let wheels = yaw_vector(self.forward, Deg(self.steering * attr.max_steer_angle));
        let front = self.position + self.forward * half_wb + wheels * (speed * dt);
        let rear = self.position - self.forward * half_wb;
        let forward = try_normalize(front - rear).unwrap_or(self.forward);
        let position = front - forward * half_wb;

        if obstacles.overlaps(position, attr.radius) {
            self.speed = 0.0;
            self.collisions += 1;
            return;
        }

        self.position = position;
        self.forward = forward;
        self.speed = speed;
    }
}

impl VehicleActuationPort for KinematicVehicle {
    fn forward_speed(&self) -> f64 {
        self.speed
    }

    fn steering(&self) -> f64 {
        self.steering
    }

    fn throttle(&self) -> f64 {
        self.throttle
    }

    fn brake(&self) -> f64 {
        self.brake
    }

    fn set_steering(&mut self, steering: f64) {
        self.steering = steering.clamp(-1.0, 1.0);
    }

    fn set_throttle(&mut self, throttle: f64) {
        self.throttle = throttle.clamp(0.0, 1.0);
    }

    fn set_brake(&mut self, brake: f64) {
        self.brake = brake.clamp(0.0, 1.0);
    }

    fn set_gear(&mut self, gear: Gear, immediate: bool) {
        if immediate || gear == self.gear {
            self.gear = gear;
            self.shift = None;
        } else if self.shift.map(|(target, _)| target) != Some(gear) {
            self.shift = Some((gear, SHIFT_TIME));
        }
    }

    fn position(&self) -> Point3d {
        self.position
    }

    fn forward(&self) -> Vector3d {
        self.forward
    }

    fn right(&self) -> Vector3d {
        right_of(self.forward).unwrap_or_else(Vector3d::zero)
    }
}
