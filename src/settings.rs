//! Game tuning and preferences
//!
//! Read from its own LocalStorage slot, separate from the scoreboard. Any
//! field missing from a stored payload falls back to its default.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::KeyValueStore;

/// How accelerate/brake input scales the base forward motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlePolicy {
    /// Forward speed multiplier while accelerating
    pub accelerate: f32,
    /// Forward speed multiplier while braking (0 holds position)
    pub brake: f32,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            accelerate: 1.5,
            brake: 0.0,
        }
    }
}

impl ThrottlePolicy {
    /// Forward speed multiplier for the given throttle input
    pub fn multiplier(&self, accelerate: bool, brake: bool) -> f32 {
        // Brake wins when both are held
        if brake {
            self.brake
        } else if accelerate {
            self.accelerate
        } else {
            1.0
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Vehicle ===
    /// Base forward speed (units/s)
    pub speed: f32,
    /// Tilt easing rate (radians/s)
    pub sway_speed: f32,
    /// Maximum tilt magnitude (radians)
    pub max_tilt_angle: f32,
    /// Accelerate/brake scaling
    pub throttle: ThrottlePolicy,
    /// Collision box half-extents around the vehicle
    pub vehicle_half_extents: Vec3,
    /// Pose the vehicle is reset to at round start
    pub spawn_position: Vec3,

    // === Track ===
    pub left_boundary: f32,
    pub right_boundary: f32,
    /// Forward-axis coordinate that ends the round (negative, forward is -z)
    pub finish_line_distance: f32,

    // === Obstacles ===
    pub obstacle_count: usize,
    pub obstacle_size: f32,
    pub obstacle_spawn_clearance: f32,

    // === Camera ===
    pub camera_offset_y: f32,
    pub camera_offset_z: f32,
    pub camera_look_ahead_z: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: VEHICLE_SPEED,
            sway_speed: SWAY_SPEED,
            max_tilt_angle: MAX_TILT_ANGLE,
            throttle: ThrottlePolicy::default(),
            vehicle_half_extents: Vec3::from_array(VEHICLE_HALF_EXTENTS),
            spawn_position: Vec3::from_array(SPAWN_POSITION),

            left_boundary: LEFT_BOUNDARY,
            right_boundary: RIGHT_BOUNDARY,
            finish_line_distance: FINISH_LINE_DISTANCE,

            obstacle_count: OBSTACLE_COUNT,
            obstacle_size: OBSTACLE_SIZE,
            obstacle_spawn_clearance: OBSTACLE_SPAWN_CLEARANCE,

            camera_offset_y: CAMERA_OFFSET_Y,
            camera_offset_z: CAMERA_OFFSET_Z,
            camera_look_ahead_z: CAMERA_LOOK_AHEAD_Z,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "lane_racer_settings";

    /// Clamp a lateral coordinate into the lane
    pub fn clamp_lateral(&self, x: f32) -> f32 {
        x.clamp(self.left_boundary, self.right_boundary)
    }

    /// Load settings from a store, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_throttle_multiplier() {
        let policy = ThrottlePolicy::default();
        assert_eq!(policy.multiplier(false, false), 1.0);
        assert_eq!(policy.multiplier(true, false), 1.5);
        assert_eq!(policy.multiplier(false, true), 0.0);
        assert_eq!(policy.multiplier(true, true), 0.0);
    }

    #[test]
    fn test_clamp_lateral() {
        let settings = Settings::default();
        assert_eq!(settings.clamp_lateral(-1000.0), LEFT_BOUNDARY);
        assert_eq!(settings.clamp_lateral(1000.0), RIGHT_BOUNDARY);
        assert_eq!(settings.clamp_lateral(12.5), 12.5);
    }

    #[test]
    fn test_settings_load_stored() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            speed: 200.0,
            obstacle_count: 4,
            ..Default::default()
        };
        store
            .set(Settings::STORAGE_KEY, &serde_json::to_string(&settings).unwrap())
            .unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"speed": 150.0}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.speed, 150.0);
        assert_eq!(settings.obstacle_count, OBSTACLE_COUNT);
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
