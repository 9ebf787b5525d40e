//! Vehicle kinematics
//!
//! Clamped integration, not physics: the vehicle drifts forward at a fixed
//! speed, slides sideways while steering and leans into the turn.

use super::input::ControlState;
use super::state::{CameraRig, Vehicle};
use crate::settings::Settings;

/// Lateral steering for a frame. Left wins when both are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    Straight,
}

impl Steer {
    pub fn from_controls(controls: &ControlState) -> Self {
        if controls.left {
            Steer::Left
        } else if controls.right {
            Steer::Right
        } else {
            Steer::Straight
        }
    }
}

/// Move `current` toward `target` by at most `max_step`, landing exactly on it
#[inline]
fn step_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(delta)
    }
}

/// Ease the sway tilt toward the lean for `steer` (left leans positive)
pub fn ease_tilt(tilt: f32, steer: Steer, dt: f32, sway_speed: f32, max_tilt: f32) -> f32 {
    let target = match steer {
        Steer::Left => max_tilt,
        Steer::Right => -max_tilt,
        Steer::Straight => 0.0,
    };
    step_toward(tilt, target, dt * sway_speed).clamp(-max_tilt, max_tilt)
}

/// Advance the vehicle by one frame.
///
/// Returns the distance to credit to the round: the base `speed * dt` unless
/// braking, in which case nothing is credited.
pub fn update_vehicle(
    vehicle: &mut Vehicle,
    controls: &ControlState,
    dt: f32,
    settings: &Settings,
) -> f32 {
    let dt = dt.max(0.0);
    let move_distance = settings.speed * dt;

    // Forward
    let throttle = settings
        .throttle
        .multiplier(controls.accelerate, controls.brake);
    vehicle.position.z -= move_distance * throttle;

    // Lateral
    let steer = Steer::from_controls(controls);
    match steer {
        Steer::Left => {
            vehicle.position.x = settings.clamp_lateral(vehicle.position.x - move_distance);
        }
        Steer::Right => {
            vehicle.position.x = settings.clamp_lateral(vehicle.position.x + move_distance);
        }
        Steer::Straight => {}
    }

    vehicle.tilt = ease_tilt(
        vehicle.tilt,
        steer,
        dt,
        settings.sway_speed,
        settings.max_tilt_angle,
    );

    if controls.brake { 0.0 } else { move_distance }
}

/// Chase camera behind and above the vehicle, looking down the lane
pub fn camera_follow(vehicle: &Vehicle, settings: &Settings) -> CameraRig {
    let p = vehicle.position;
    CameraRig {
        position: glam::Vec3::new(
            p.x,
            p.y + settings.camera_offset_y,
            p.z + settings.camera_offset_z,
        ),
        look_at: glam::Vec3::new(p.x, p.y, p.z - settings.camera_look_ahead_z),
    }
}
