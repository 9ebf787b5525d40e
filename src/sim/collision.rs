//! Collision detection between the vehicle and obstacles
//!
//! Everything is an axis-aligned box. Obstacles never move, so their boxes are
//! computed once at spawn; the vehicle box is rebuilt from its position each
//! frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Obstacle;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` extending `half_extents` along each axis
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Interval overlap on all three axes. Touching faces count as a hit.
    pub fn intersects(&self, other: &Aabb) -> bool {
        (self.min.x <= other.max.x && self.max.x >= other.min.x)
            && (self.min.y <= other.max.y && self.max.y >= other.min.y)
            && (self.min.z <= other.max.z && self.max.z >= other.min.z)
    }
}

/// First obstacle whose box intersects `vehicle`, if any
pub fn first_collision<'a>(vehicle: &Aabb, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles.iter().find(|o| vehicle.intersects(&o.bounds))
}

/// Whether `vehicle` intersects any obstacle
pub fn check_collision(vehicle: &Aabb, obstacles: &[Obstacle]) -> bool {
    first_collision(vehicle, obstacles).is_some()
}
