//! Lane Racer - A lane-dodging 3D driving mini-game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (input, kinematics, collisions, round state)
//! - `session`: Multi-player queue and round hand-off
//! - `scoreboard`: Best-per-player leaderboard, merged across sessions
//! - `world`: Scene, renderer and per-round resource arena contracts
//! - `persistence`: Key-value storage backends (LocalStorage on web)
//! - `platform`: Browser/native clock abstraction
//! - `assets`: Vehicle model validation
//! - `game`: Orchestrator wiring the pieces into one frame loop

pub mod assets;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod scoreboard;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;
pub mod world;

pub use game::Game;
pub use scoreboard::Scoreboard;
pub use session::{Player, Session, SessionEvent};
pub use settings::{Settings, ThrottlePolicy};

/// Game configuration constants
pub mod consts {
    /// Longest frame step the simulation accepts (s); longer gaps are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Forward speed of the vehicle (units/s)
    pub const VEHICLE_SPEED: f32 = 180.0;
    /// Rate at which the sway tilt eases (radians/s)
    pub const SWAY_SPEED: f32 = 2.0;
    /// Maximum sway tilt magnitude (radians)
    pub const MAX_TILT_ANGLE: f32 = 0.15;

    /// Lane dimensions
    pub const LEFT_BOUNDARY: f32 = -250.0;
    pub const RIGHT_BOUNDARY: f32 = 250.0;
    /// Forward-axis coordinate of the finish line (forward is -z)
    pub const FINISH_LINE_DISTANCE: f32 = -15000.0;

    /// Vehicle collision half-extents (lateral, vertical, forward)
    pub const VEHICLE_HALF_EXTENTS: [f32; 3] = [15.0, 7.0, 10.0];
    /// Vehicle spawn position
    pub const SPAWN_POSITION: [f32; 3] = [0.0, 0.0, 0.0];

    /// Obstacles per round
    pub const OBSTACLE_COUNT: usize = 10;
    /// Obstacle cube edge length
    pub const OBSTACLE_SIZE: f32 = 20.0;
    /// No obstacle is placed closer than this to the spawn point
    pub const OBSTACLE_SPAWN_CLEARANCE: f32 = 200.0;

    /// Chase camera offsets relative to the vehicle
    pub const CAMERA_OFFSET_Y: f32 = 50.0;
    pub const CAMERA_OFFSET_Z: f32 = 100.0;
    pub const CAMERA_LOOK_AHEAD_Z: f32 = 100.0;

    /// Scenery
    pub const TREE_COUNT: usize = 100;
    /// Trees are scattered over x in [-600, 600], z in [-15000, 15000]
    pub const TREE_HALF_SPREAD_X: f32 = 600.0;
    pub const TREE_HALF_SPREAD_Z: f32 = 15000.0;
    /// Trees closer to the lane center than this are dropped
    pub const TREE_MIN_ABS_X: f32 = 400.0;
}

/// Round a value to two decimal places
#[inline]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
