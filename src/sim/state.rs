//! Round state and core simulation types
//!
//! A `Round` is one player's run from spawn to finish line or crash. The same
//! `Round` value is reused for every player; `start` resets it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::round_to_hundredths;
use crate::settings::Settings;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for a start request
    #[default]
    Idle,
    /// Frames are being simulated
    Running,
    /// Round ended; score emitted
    Finished,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishCause {
    /// Vehicle crossed the finish line
    FinishLine,
    /// Vehicle hit an obstacle
    Collision { obstacle_id: u32 },
}

/// A player's result: elapsed seconds and whole units of forward travel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub time: f64,
    pub distance: f64,
}

impl Score {
    pub fn new(time: f64, distance: f64) -> Self {
        Self { time, distance }
    }

    /// Ranking key used by the scoreboard
    pub fn combined(&self) -> f64 {
        self.time + self.distance
    }

    pub fn is_zero(&self) -> bool {
        self.time == 0.0 && self.distance == 0.0
    }
}

/// The player's vehicle pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// x = lateral, y = vertical, z = forward (decreasing)
    pub position: Vec3,
    /// Sway roll around the forward axis (radians)
    pub tilt: f32,
}

impl Vehicle {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            tilt: 0.0,
        }
    }

    /// At the configured spawn pose, pulled into the lane
    pub fn spawn(settings: &Settings) -> Self {
        let mut position = settings.spawn_position;
        position.x = settings.clamp_lateral(position.x);
        Self::at(position)
    }

    /// Collision box around the current position
    pub fn bounds(&self, half_extents: Vec3) -> Aabb {
        Aabb::from_center(self.position, half_extents)
    }
}

/// A static obstacle cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub position: Vec3,
    /// Fixed for the obstacle's lifetime
    pub bounds: Aabb,
}

impl Obstacle {
    /// Cube of edge `size` centered on `position`
    pub fn new(id: u32, position: Vec3, size: f32) -> Self {
        Self {
            id,
            position,
            bounds: Aabb::from_center(position, Vec3::splat(size / 2.0)),
        }
    }
}

/// Chase camera placement derived from the vehicle pose
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// One player's play-through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    pub phase: RoundPhase,
    /// Wall-clock start (ms)
    pub start_ms: f64,
    /// Wall-clock end (ms), valid once finished
    pub end_ms: f64,
    /// Unrounded forward distance accrued this round
    pub distance: f32,
    /// Frames simulated with a vehicle present
    pub frames: u64,
    /// `None` until the vehicle asset has loaded
    pub vehicle: Option<Vehicle>,
    pub obstacles: Vec<Obstacle>,
    pub camera: CameraRig,
    pub cause: Option<FinishCause>,
}

impl Round {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn has_vehicle(&self) -> bool {
        self.vehicle.is_some()
    }

    /// The vehicle asset became available; place it at spawn
    pub fn attach_vehicle(&mut self, settings: &Settings) {
        if self.vehicle.is_some() {
            log::debug!("Vehicle already attached");
            return;
        }
        self.vehicle = Some(Vehicle::spawn(settings));
        log::info!("Vehicle attached");
    }

    /// Idle/Finished -> Running. Returns false if a round is already running.
    pub fn start(&mut self, settings: &Settings, obstacles: Vec<Obstacle>, now_ms: f64) -> bool {
        if self.is_running() {
            log::warn!("Ignoring round start: a round is already running");
            return false;
        }

        self.phase = RoundPhase::Running;
        self.start_ms = now_ms;
        self.end_ms = now_ms;
        self.distance = 0.0;
        self.frames = 0;
        self.obstacles = obstacles;
        self.cause = None;
        if let Some(vehicle) = self.vehicle.as_mut() {
            *vehicle = Vehicle::spawn(settings);
        }
        log::info!("Round started with {} obstacles", self.obstacles.len());
        true
    }

    /// Running -> Finished. Returns the final score, or `None` if no round
    /// was running.
    pub fn finish(&mut self, cause: FinishCause, now_ms: f64) -> Option<Score> {
        if !self.is_running() {
            log::debug!("Ignoring round finish: no round running");
            return None;
        }

        self.phase = RoundPhase::Finished;
        self.end_ms = now_ms;
        self.cause = Some(cause);

        let score = self.score();
        log::info!(
            "Round finished ({:?}): time={:.2}s distance={}",
            cause,
            score.time,
            score.distance
        );
        Some(score)
    }

    /// Score as reported to the session: seconds to two decimals, whole distance
    pub fn score(&self) -> Score {
        let elapsed_secs = ((self.end_ms - self.start_ms) / 1000.0).max(0.0);
        Score {
            time: round_to_hundredths(elapsed_secs),
            distance: (self.distance as f64).round(),
        }
    }

    /// Drop the round's obstacles (world teardown)
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }
}
