//! Round simulation module
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - Time arrives as explicit `dt` and timestamps
//! - Input arrives as queued key events
//! - Obstacle layouts come from a seeded RNG

pub mod collision;
pub mod input;
pub mod state;
pub mod tick;
pub mod vehicle;

pub use collision::{Aabb, check_collision, first_collision};
pub use input::{Action, ControlState, InputSampler, KeyEvent};
pub use state::{CameraRig, FinishCause, Obstacle, Round, RoundPhase, Score, Vehicle};
pub use tick::{generate_obstacles, tick};
pub use vehicle::{Steer, camera_follow, ease_tilt, update_vehicle};
