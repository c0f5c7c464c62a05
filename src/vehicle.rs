//! The interface to the controlled vehicle, and the values exchanged with it each tick.

use crate::math::{Point3d, Vector3d};

/// Read/write access to a vehicle's control inputs and kinematic state.
pub trait VehicleActuationPort {
    /// The signed speed along the vehicle's forward axis.
    fn forward_speed(&self) -> f64;

    /// The current steering input.
    fn steering(&self) -> f64;

    /// The current throttle input.
    fn throttle(&self) -> f64;

    /// The current brake input.
    fn brake(&self) -> f64;

    fn set_steering(&mut self, steering: f64);

    fn set_throttle(&mut self, throttle: f64);

    fn set_brake(&mut self, brake: f64);

    /// Selects a gear, optionally skipping any shift delay.
    fn set_gear(&mut self, gear: Gear, immediate: bool);

    /// The world space position of the vehicle.
    fn position(&self) -> Point3d;

    /// A unit vector along the vehicle's heading.
    fn forward(&self) -> Vector3d;

    /// A unit vector pointing out of the vehicle's right side.
    fn right(&self) -> Vector3d;
}

impl<T: VehicleActuationPort + ?Sized> VehicleActuationPort for &mut T {
    fn forward_speed(&self) -> f64 {
        (**self).forward_speed()
    }

    fn steering(&self) -> f64 {
        (**self).steering()
    }

    fn throttle(&self) -> f64 {
        (**self).throttle()
    }

    fn brake(&self) -> f64 {
        (**self).brake()
    }

    fn set_steering(&mut self, steering: f64) {
        (**self).set_steering(steering)
    }

    fn set_throttle(&mut self, throttle: f64) {
        (**self).set_throttle(throttle)
    }

    fn set_brake(&mut self, brake: f64) {
        (**self).set_brake(brake)
    }

    fn set_gear(&mut self, gear: Gear, immediate: bool) {
        (**self).set_gear(gear, immediate)
    }

    fn position(&self) -> Point3d {
        (**self).position()
    }

    fn forward(&self) -> Vector3d {
        (**self).forward()
    }

    fn right(&self) -> Vector3d {
        (**self).right()
    }
}

/// The direction of travel selected by the transmission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gear {
    #[default]
    Forward,
    Reverse,
}

impl Gear {
    /// The gear number understood by vehicle transmissions.
    pub fn number(self) -> i32 {
        match self {
            Gear::Forward => 1,
            Gear::Reverse => -1,
        }
    }

    /// The sign of the forward speed produced by throttle in this gear.
    pub fn direction(self) -> f64 {
        match self {
            Gear::Forward => 1.0,
            Gear::Reverse => -1.0,
        }
    }
}

/// A snapshot of a vehicle's kinematic state, read once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    pub position: Point3d,
    pub forward: Vector3d,
    pub right: Vector3d,
    /// The signed speed along `forward`.
    pub forward_speed: f64,
}

impl VehicleState {
    /// Reads the state of a vehicle.
    pub fn read(vehicle: &impl VehicleActuationPort) -> Self {
        Self {
            position: vehicle.position(),
            forward: vehicle.forward(),
            right: vehicle.right(),
            forward_speed: vehicle.forward_speed(),
        }
    }
}

/// The control inputs computed for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlOutput {
    /// In `[-1, 1]`, positive turns right.
    pub steering: f64,
    /// In `[0, 1]`.
    pub throttle: f64,
    /// In `[0, 1]`.
    pub brake: f64,
    pub gear: Gear,
}

impl ControlOutput {
    /// Clamps every input to its valid range. NaN inputs become neutral.
    pub fn clamped(self) -> Self {
        let clamp = |value: f64, min: f64, max: f64, neutral: f64| {
            if value.is_nan() {
                neutral
            } else {
                value.clamp(min, max)
            }
        };
        Self {
            steering: clamp(self.steering, -1.0, 1.0, 0.0),
            throttle: clamp(self.throttle, 0.0, 1.0, 0.0),
            brake: clamp(self.brake, 0.0, 1.0, 0.0),
            gear: self.gear,
        }
    }

    /// Writes the inputs to a vehicle.
    ///
    /// # Parameters
    /// * `vehicle` - The vehicle to control
    /// * `shift_now` - Whether a gear change should skip the shift delay
    pub fn apply(&self, vehicle: &mut impl VehicleActuationPort, shift_now: bool) {
        vehicle.set_gear(self.gear, shift_now);
        vehicle.set_steering(self.steering);
        vehicle.set_throttle(self.throttle);
        vehicle.set_brake(self.brake);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamped_stays_in_range() {
        let output = ControlOutput {
            steering: -3.0,
            throttle: -0.2,
            brake: 1.5,
            gear: Gear::Forward,
        }
        .clamped();
        assert_eq!(output.steering, -1.0);
        assert_eq!(output.throttle, 0.0);
        assert_eq!(output.brake, 1.0);

        let output = ControlOutput {
            steering: f64::NAN,
            throttle: f64::NAN,
            brake: f64::NAN,
            gear: Gear::Reverse,
        }
        .clamped();
        assert_eq!((output.steering, output.throttle, output.brake), (0.0, 0.0, 0.0));
        assert_eq!(output.gear, Gear::Reverse);
    }

    #[test]
    fn gear_numbers() {
        assert_eq!(Gear::Forward.number(), 1);
        assert_eq!(Gear::Reverse.number(), -1);
        assert_eq!(Gear::Reverse.direction(), -1.0);
    }
}
