//! Tunable parameters.
//!
//! Distances are in world units and times in seconds. The defaults assume
//! centimetres.

use crate::error::ConfigError;
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The tunables of a [PursuitController](crate::PursuitController).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ControllerConfig {
    /// How far ahead of the vehicle the path is checked for upcoming turns.
    pub braking_look_ahead: f64,
    /// The steering look-ahead used in the sharpest turns.
    pub min_look_ahead_distance: f64,
    /// The steering look-ahead used on straights.
    pub max_look_ahead_distance: f64,
    /// The tangent alignment below which braking starts.
    /// Lower values brake more aggressively.
    pub braking_sharpness: f64,
    /// The length of each obstacle probe.
    pub obstacle_trace_distance: f64,
    /// The radius of each obstacle probe.
    pub obstacle_trace_radius: f64,
    /// The angle between the centre probe and each side probe, in degrees.
    pub avoidance_probe_angle: f64,
    /// How strongly a detected obstacle bends the steering direction.
    /// Values above 1 overshoot the safe direction.
    pub avoidance_strength: f64,
    /// How long the vehicle must stand still before recovering.
    pub max_stuck_time: f64,
    /// How long the vehicle reverses while recovering.
    pub unstuck_time: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            braking_look_ahead: 2500.0,
            min_look_ahead_distance: 600.0,
            max_look_ahead_distance: 1500.0,
            braking_sharpness: 0.8,
            obstacle_trace_distance: 1500.0,
            obstacle_trace_radius: 100.0,
            avoidance_probe_angle: 25.0,
            avoidance_strength: 1.5,
            max_stuck_time: 3.0,
            unstuck_time: 1.5,
        }
    }
}

impl ControllerConfig {
    /// The range of steering look-ahead distances, from sharpest turn to straight.
    pub fn look_ahead_range(&self) -> Result<Interval<f64>, ConfigError> {
        let (min, max) = (self.min_look_ahead_distance, self.max_look_ahead_distance);
        if min > 0.0 && max.is_finite() && min <= max {
            Ok(Interval::new(min, max))
        } else {
            Err(ConfigError::LookAhead { min, max })
        }
    }

    /// Checks the predictive braking tunables.
    pub fn validate_braking(&self) -> Result<(), ConfigError> {
        let (look_ahead, sharpness) = (self.braking_look_ahead, self.braking_sharpness);
        if look_ahead > 0.0 && sharpness > 0.0 && look_ahead.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::Braking {
                look_ahead,
                sharpness,
            })
        }
    }

    /// Checks the obstacle probe tunables.
    pub fn validate_avoidance(&self) -> Result<(), ConfigError> {
        let (distance, radius) = (self.obstacle_trace_distance, self.obstacle_trace_radius);
        if distance > 0.0 && radius > 0.0 && distance.is_finite() && radius.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::Avoidance { distance, radius })
        }
    }

    /// Checks the stuck recovery timings.
    pub fn validate_recovery(&self) -> Result<(), ConfigError> {
        let (max_stuck_time, unstuck_time) = (self.max_stuck_time, self.unstuck_time);
        if max_stuck_time > 0.0 && unstuck_time > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Recovery {
                max_stuck_time,
                unstuck_time,
            })
        }
    }
}

/// The largest number of obstacles which may be requested.
pub const MAX_OBSTACLES: usize = 10_000;

/// The tunables of obstacle placement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ObstacleFieldConfig {
    /// The number of obstacles to place.
    pub number_of_obstacles: usize,
    /// The minimum lateral distance from the path's centre line.
    pub min_offset_distance: f64,
    /// The maximum lateral distance from the path's centre line.
    pub max_offset_distance: f64,
    /// The minimum distance between any two obstacles.
    pub min_distance_between_obstacles: f64,
    /// The collision radius of each obstacle.
    pub obstacle_radius: f64,
    /// The visual representation of each obstacle.
    pub mesh: Option<String>,
}

impl Default for ObstacleFieldConfig {
    fn default() -> Self {
        Self {
            number_of_obstacles: 50,
            min_offset_distance: 200.0,
            max_offset_distance: 400.0,
            min_distance_between_obstacles: 150.0,
            obstacle_radius: 30.0,
            mesh: Some("cone".to_string()),
        }
    }
}

impl ObstacleFieldConfig {
    /// The band of lateral offsets obstacles are placed within.
    pub fn offset_band(&self) -> Result<Interval<f64>, ConfigError> {
        let band = Interval::new(self.min_offset_distance, self.max_offset_distance);
        if band.min >= 0.0 && band.max.is_finite() && band.is_ordered() {
            Ok(band)
        } else {
            Err(ConfigError::OffsetBand {
                min: band.min,
                max: band.max,
            })
        }
    }

    /// Checks the requested number of obstacles is not absurdly large.
    /// A count of zero is checked by placement itself.
    pub fn validate_count(&self) -> Result<(), ConfigError> {
        match self.number_of_obstacles {
            count if count > MAX_OBSTACLES => Err(ConfigError::ObstacleCount(count)),
            _ => Ok(()),
        }
    }

    /// Checks the separation constraint.
    pub fn validate_separation(&self) -> Result<(), ConfigError> {
        let dist = self.min_distance_between_obstacles;
        if dist >= 0.0 && dist.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::Separation(dist))
        }
    }
}

/// The complete configuration of a run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct TrackPilotConfig {
    pub controller: ControllerConfig,
    pub obstacles: ObstacleFieldConfig,
}

#[cfg(feature = "serde")]
impl TrackPilotConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}
