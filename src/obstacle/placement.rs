use super::Obstacle;
use crate::config::ObstacleFieldConfig;
use crate::error::PlacementError;
use crate::math::Point3d;
use crate::path::PathProvider;
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;
use rand::Rng;

/// The number of placement attempts allowed per requested obstacle.
pub const ATTEMPTS_PER_OBSTACLE: usize = 10;

/// The outcome of placing obstacles along a path.
#[derive(Clone, Debug)]
pub struct Placement {
    /// The number of obstacles requested.
    pub requested: usize,
    /// The number of candidate positions drawn.
    pub attempts: usize,
    /// The obstacles placed, never more than requested.
    pub obstacles: Vec<Obstacle>,
}

impl Placement {
    /// Whether every requested obstacle was placed.
    pub fn is_complete(&self) -> bool {
        self.obstacles.len() == self.requested
    }

    /// The number of requested obstacles which could not be placed.
    pub fn shortfall(&self) -> usize {
        self.requested - self.obstacles.len()
    }

    /// The smallest distance between any two placed obstacles.
    pub fn min_separation(&self) -> Option<f64> {
        self.obstacles
            .iter()
            .tuple_combinations()
            .map(|(a, b)| a.position.distance(b.position))
            .min_by(f64::total_cmp)
    }
}

/// Places obstacles beside a path by rejection sampling.
///
/// Candidates are drawn uniformly along the path and offset to a random side by a
/// random distance within the configured band. Candidates closer than the minimum
/// separation to an already placed obstacle are rejected. At most
/// [ATTEMPTS_PER_OBSTACLE] candidates are drawn per requested obstacle, so fewer
/// obstacles than requested may be placed.
pub fn place_obstacles<R: Rng + ?Sized>(
    path: &impl PathProvider,
    config: &ObstacleFieldConfig,
    rng: &mut R,
) -> Result<Placement, PlacementError> {
    if config.mesh.is_none() {
        return Err(PlacementError::MissingMesh);
    }
    let length = path.length();
    if !path.is_valid() || !(length > 0.0 && length.is_finite()) {
        return Err(PlacementError::InvalidPath);
    }
    let requested = config.number_of_obstacles;
    if requested == 0 {
        return Err(PlacementError::NoObstacles);
    }
    config.validate_count()?;
    let band = config.offset_band()?;
    config.validate_separation()?;

    let separation = config.min_distance_between_obstacles;
    let max_attempts = requested.saturating_mul(ATTEMPTS_PER_OBSTACLE);
    let mut obstacles: Vec<Obstacle> = Vec::with_capacity(requested);
    let mut attempts = 0;

    while attempts < max_attempts && obstacles.len() < requested {
        attempts += 1;

        let Some(position) = random_point_beside_path(path, length, band, rng) else {
            continue;
        };

        let too_close = obstacles
            .iter()
            .any(|other| other.position.distance2(position) < separation * separation);
        if too_close {
            continue;
        }

        obstacles.push(Obstacle {
            position,
            radius: config.obstacle_radius,
            exclusion_radius: 0.5 * separation,
        });
    }

    Ok(Placement {
        requested,
        attempts,
        obstacles,
    })
}

/// Draws a random point beside the path, within the band of lateral offsets.
fn random_point_beside_path<R: Rng + ?Sized>(
    path: &impl PathProvider,
    length: f64,
    band: Interval<f64>,
    rng: &mut R,
) -> Option<Point3d> {
    let pos = rng.gen_range(0.0..length);
    let offset = rng.gen_range(band.min..=band.max);
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    path.sample(pos).lat_offset(side * offset)
}
