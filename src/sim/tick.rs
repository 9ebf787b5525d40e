//! Per-frame round update
//!
//! Order within a frame is fixed: sample input, move the vehicle, test
//! collisions, then check whether the round is over.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::first_collision;
use super::input::InputSampler;
use super::state::{FinishCause, Obstacle, Round, Score};
use super::vehicle::{camera_follow, update_vehicle};
use crate::settings::Settings;

/// Advance a running round by one frame.
///
/// Returns the final score on the frame the round ends. Does nothing (beyond
/// draining queued input) when no round is running or the vehicle has not
/// loaded yet.
pub fn tick(
    round: &mut Round,
    input: &mut InputSampler,
    settings: &Settings,
    dt: f32,
    now_ms: f64,
) -> Option<Score> {
    let controls = input.sample();

    if !round.is_running() {
        return None;
    }

    let Some(vehicle) = round.vehicle.as_mut() else {
        return None;
    };

    round.frames += 1;
    round.distance += update_vehicle(vehicle, &controls, dt, settings);
    round.camera = camera_follow(vehicle, settings);

    let bounds = vehicle.bounds(settings.vehicle_half_extents);
    let forward = vehicle.position.z;

    let cause = if let Some(obstacle) = first_collision(&bounds, &round.obstacles) {
        log::info!("Collision with obstacle {}", obstacle.id);
        Some(FinishCause::Collision {
            obstacle_id: obstacle.id,
        })
    } else if forward <= settings.finish_line_distance {
        Some(FinishCause::FinishLine)
    } else {
        None
    };

    cause.and_then(|cause| round.finish(cause, now_ms))
}

/// Scatter the round's obstacles from `seed`.
///
/// Obstacles sit on the lane floor, fully inside the lane, between the spawn
/// clearance zone and the finish line. The same seed always yields the same
/// layout.
pub fn generate_obstacles(settings: &Settings, seed: u64) -> Vec<Obstacle> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let half = settings.obstacle_size / 2.0;

    let x_min = settings.left_boundary + half;
    let x_max = settings.right_boundary - half;
    // Forward is -z: nearest allowed is just past the clearance zone
    let z_near = -settings.obstacle_spawn_clearance;
    let z_far = settings.finish_line_distance + half;

    let mut sample = |lo: f32, hi: f32| {
        if lo < hi {
            rng.random_range(lo..=hi)
        } else {
            lo
        }
    };

    let obstacles: Vec<Obstacle> = (0..settings.obstacle_count)
        .map(|i| {
            let x = sample(x_min, x_max);
            let z = sample(z_far, z_near);
            Obstacle::new(
                i as u32 + 1,
                Vec3::new(x, settings.spawn_position.y, z),
                settings.obstacle_size,
            )
        })
        .collect();

    log::debug!("Generated {} obstacles (seed {})", obstacles.len(), seed);
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::KeyEvent;
    use crate::sim::state::{RoundPhase, Vehicle};

    const DT: f32 = 1.0 / 60.0;

    fn running_round(settings: &Settings, obstacles: Vec<Obstacle>) -> Round {
        let mut round = Round::new();
        round.attach_vehicle(settings);
        round.start(settings, obstacles, 0.0);
        round
    }

    #[test]
    fn test_idle_round_does_not_move() {
        let settings = Settings::default();
        let mut round = Round::new();
        round.attach_vehicle(&settings);
        let mut input = InputSampler::new();

        assert!(tick(&mut round, &mut input, &settings, DT, 16.0).is_none());
        assert_eq!(round.vehicle, Some(Vehicle::at(settings.spawn_position)));
        assert_eq!(round.frames, 0);
    }

    #[test]
    fn test_missing_vehicle_is_noop() {
        let settings = Settings::default();
        let mut round = Round::new();
        round.start(&settings, Vec::new(), 0.0);
        let mut input = InputSampler::new();
        input.push(KeyEvent::down("a"));

        for i in 0..100 {
            assert!(tick(&mut round, &mut input, &settings, DT, i as f64 * 16.0).is_none());
        }
        assert!(round.is_running());
        assert_eq!(round.distance, 0.0);
        assert_eq!(round.frames, 0);
        // Input was still sampled
        assert!(input.pressed("a"));

        // Vehicle arrives late and the round picks up from spawn
        round.attach_vehicle(&settings);
        tick(&mut round, &mut input, &settings, DT, 1616.0);
        assert_eq!(round.frames, 1);
        assert!(round.distance > 0.0);
    }

    #[test]
    fn test_round_reaches_finish_line() {
        let settings = Settings::default();
        let mut round = running_round(&settings, Vec::new());
        let mut input = InputSampler::new();

        let mut results = Vec::new();
        let mut now = 0.0;
        for _ in 0..10_000 {
            now += DT as f64 * 1000.0;
            if let Some(score) = tick(&mut round, &mut input, &settings, DT, now) {
                results.push(score);
            }
        }

        assert_eq!(results.len(), 1);
        let score = results[0];
        let move_distance = (settings.speed * DT) as f64;
        let expected = settings.finish_line_distance.abs().round() as f64;
        assert!((score.distance - expected).abs() <= move_distance + 1.0);
        assert!(score.time >= 0.0);
        assert_eq!(round.phase, RoundPhase::Finished);
        assert_eq!(round.cause, Some(FinishCause::FinishLine));
    }

    #[test]
    fn test_collision_ends_round() {
        let settings = Settings::default();
        let obstacle = Obstacle::new(9, Vec3::new(0.0, 0.0, -300.0), settings.obstacle_size);
        let mut round = running_round(&settings, vec![obstacle]);
        let mut input = InputSampler::new();

        let mut finished = None;
        for i in 1..=200 {
            if let Some(score) = tick(&mut round, &mut input, &settings, DT, i as f64 * 16.0) {
                finished = Some(score);
                break;
            }
        }

        let score = finished.expect("vehicle should hit the obstacle");
        assert_eq!(round.cause, Some(FinishCause::Collision { obstacle_id: 9 }));
        // Front of vehicle (z-10) meets obstacle rear face (z=-290)
        assert!(score.distance >= 279.0 && score.distance <= 284.0);
    }

    #[test]
    fn test_steering_avoids_obstacle() {
        let settings = Settings::default();
        let obstacle = Obstacle::new(1, Vec3::new(0.0, 0.0, -600.0), settings.obstacle_size);
        let mut round = running_round(&settings, vec![obstacle]);
        let mut input = InputSampler::new();

        // Swerve right for half a second, then drive straight
        input.push(KeyEvent::down("ArrowRight"));
        for i in 1..=30 {
            tick(&mut round, &mut input, &settings, DT, i as f64 * 16.0);
        }
        input.push(KeyEvent::up("ArrowRight"));
        for i in 31..=400 {
            tick(&mut round, &mut input, &settings, DT, i as f64 * 16.0);
        }

        assert!(round.is_running());
        assert!(round.vehicle.map(|v| v.position.z < -700.0).unwrap_or(false));
    }

    #[test]
    fn test_finished_round_ignores_frames() {
        let settings = Settings {
            finish_line_distance: -30.0,
            ..Default::default()
        };
        let mut round = running_round(&settings, Vec::new());
        let mut input = InputSampler::new();

        let mut count = 0;
        for i in 0..100 {
            if tick(&mut round, &mut input, &settings, DT, i as f64).is_some() {
                count += 1;
            }
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_brake_freezes_distance() {
        let settings = Settings::default();
        let mut round = running_round(&settings, Vec::new());
        let mut input = InputSampler::new();

        input.push(KeyEvent::down("s"));
        for i in 0..60 {
            tick(&mut round, &mut input, &settings, DT, i as f64);
        }
        assert_eq!(round.distance, 0.0);
        assert_eq!(round.vehicle.map(|v| v.position.z), Some(0.0));
    }

    #[test]
    fn test_generate_obstacles_deterministic_and_in_bounds() {
        let settings = Settings::default();
        let a = generate_obstacles(&settings, 12345);
        let b = generate_obstacles(&settings, 12345);
        assert_eq!(a, b);
        assert_eq!(a.len(), settings.obstacle_count);

        let half = settings.obstacle_size / 2.0;
        for o in &a {
            assert!(o.bounds.min.x >= settings.left_boundary - 1e-3);
            assert!(o.bounds.max.x <= settings.right_boundary + 1e-3);
            assert!(o.position.z <= -settings.obstacle_spawn_clearance);
            assert!(o.position.z >= settings.finish_line_distance + half - 1e-3);
        }

        let c = generate_obstacles(&settings, 54321);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generated_obstacles_clear_spawn() {
        let settings = Settings::default();
        let spawn = Vehicle::at(settings.spawn_position).bounds(settings.vehicle_half_extents);
        for seed in 0..50 {
            let obstacles = generate_obstacles(&settings, seed);
            assert!(first_collision(&spawn, &obstacles).is_none());
        }
    }

    #[test]
    fn test_generate_obstacles_degenerate_lane() {
        let settings = Settings {
            left_boundary: 0.0,
            right_boundary: 0.0,
            obstacle_count: 3,
            ..Default::default()
        };
        let obstacles = generate_obstacles(&settings, 1);
        assert_eq!(obstacles.len(), 3);
    }
}
