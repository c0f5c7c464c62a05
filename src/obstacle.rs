//! Static obstacles and the scene which holds them.

use crate::config::ObstacleFieldConfig;
use crate::error::PlacementError;
use crate::math::{try_normalize, Point3d, Vector3d};
use crate::path::PathProvider;
use crate::probe::{ProbeHit, SpatialProbe};
use crate::ObstacleId;
use cgmath::prelude::*;
use log::{info, warn};
pub use placement::{place_obstacles, Placement, ATTEMPTS_PER_OBSTACLE};
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

mod placement;

/// A static, spherical obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    /// The world space position of the obstacle's centre.
    pub position: Point3d,
    /// The collision radius.
    pub radius: f64,
    /// Half the minimum distance kept between obstacles when they were placed.
    pub exclusion_radius: f64,
}

/// A set of obstacles, which can be probed.
///
/// The set is written once during setup and only read afterwards.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleField {
    obstacles: SlotMap<ObstacleId, Obstacle>,
}

impl ObstacleField {
    /// Creates an empty obstacle field.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an obstacle.
    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        self.obstacles.insert(obstacle)
    }

    /// Gets the obstacle with the given ID.
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Returns an iterator over all the obstacles.
    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.obstacles.iter()
    }

    /// The number of obstacles.
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Places obstacles along a path and adds them to the field.
    ///
    /// Failed preconditions skip placement entirely and are logged as a warning.
    /// Placing fewer obstacles than requested is not an error.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        path: &impl PathProvider,
        config: &ObstacleFieldConfig,
        rng: &mut R,
    ) -> Result<Vec<ObstacleId>, PlacementError> {
        let placement = place_obstacles(path, config, rng).map_err(|err| {
            warn!("Skipping obstacle placement: {}", err);
            err
        })?;

        info!(
            "Placed {} obstacles along path after {} attempts.",
            placement.obstacles.len(),
            placement.attempts
        );
        if !placement.is_complete() {
            info!(
                "{} of {} requested obstacles could not be placed.",
                placement.shortfall(),
                placement.requested
            );
        }

        Ok(placement
            .obstacles
            .into_iter()
            .map(|obstacle| self.insert(obstacle))
            .collect())
    }

    /// Whether a sphere at `centre` would intersect any obstacle.
    pub fn overlaps(&self, centre: Point3d, radius: f64) -> bool {
        self.obstacles
            .values()
            .any(|obstacle| obstacle.position.distance2(centre) < (obstacle.radius + radius).powi(2))
    }
}

impl SpatialProbe for ObstacleField {
    fn cast_sphere(&self, start: Point3d, end: Point3d, radius: f64, _ignore_self: bool) -> Option<ProbeHit> {
        let sweep = end - start;
        let length = sweep.magnitude();
        let dir = try_normalize(sweep);

        self.obstacles
            .values()
            .filter_map(|obstacle| {
                let reach = obstacle.radius + radius;
                let rel = start - obstacle.position;
                let c = rel.magnitude2() - reach * reach;
                let distance = if c <= 0.0 {
                    // Already touching at the start of the sweep
                    0.0
                } else {
                    let dir = dir?;
                    let b = rel.dot(dir);
                    let discr = b * b - c;
                    if b > 0.0 || discr < 0.0 {
                        return None;
                    }
                    let t = -b - discr.sqrt();
                    if t > length {
                        return None;
                    }
                    t
                };
                let centre = start + dir.map_or(Vector3d::zero(), |dir| dir * distance);
                let impact_point = try_normalize(centre - obstacle.position)
                    .map_or(obstacle.position, |n| obstacle.position + n * obstacle.radius);
                Some(ProbeHit {
                    distance,
                    impact_point,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
