//! Error types for controller setup, configuration and obstacle placement.

use thiserror::Error;

/// A missing or invalid collaborator. Disables a controller permanently.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SetupError {
    /// No path to follow was provided.
    #[error("no path to follow was provided")]
    MissingPath,

    /// No vehicle to read state from and write controls to was provided.
    #[error("no vehicle actuation target was provided")]
    MissingVehicle,

    /// The path has fewer than two control points.
    #[error("path is invalid: it needs at least two control points")]
    InvalidPath,
}

/// A tunable outside its valid range. Disables only the affected subsystem.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("look-ahead distances must satisfy 0 < min ({min}) <= max ({max})")]
    LookAhead { min: f64, max: f64 },

    #[error("braking look-ahead ({look_ahead}) and sharpness ({sharpness}) must be positive")]
    Braking { look_ahead: f64, sharpness: f64 },

    #[error("obstacle trace distance ({distance}) and radius ({radius}) must be positive")]
    Avoidance { distance: f64, radius: f64 },

    #[error("max stuck time ({max_stuck_time}) and unstuck time ({unstuck_time}) must be positive")]
    Recovery {
        max_stuck_time: f64,
        unstuck_time: f64,
    },

    #[error("lateral offset band must satisfy 0 <= min ({min}) <= max ({max})")]
    OffsetBand { min: f64, max: f64 },

    #[error("number of obstacles ({0}) exceeds the maximum of {max}", max = crate::config::MAX_OBSTACLES)]
    ObstacleCount(usize),

    #[error("minimum distance between obstacles ({0}) must not be negative")]
    Separation(f64),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// A failed precondition which causes obstacle placement to be skipped entirely.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlacementError {
    #[error("path is invalid or has zero length")]
    InvalidPath,

    #[error("number of obstacles must be greater than zero")]
    NoObstacles,

    #[error("no obstacle mesh was provided")]
    MissingMesh,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display() {
        let err = ConfigError::LookAhead {
            min: 1500.0,
            max: 600.0,
        };
        assert!(err.to_string().contains("1500"));

        let err = PlacementError::from(ConfigError::Separation(-1.0));
        assert!(err.to_string().contains("must not be negative"));

        assert!(SetupError::InvalidPath.to_string().contains("two control points"));
    }
}
