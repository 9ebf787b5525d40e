//! World, scene and renderer contracts
//!
//! The game never draws anything itself. At round start it describes the
//! world in a `WorldLayout` and hands it to a `SceneBuilder`, which records
//! every resource it creates in the round's `WorldArena`. At round end the
//! arena is consumed and each resource released.

use std::collections::HashSet;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{Obstacle, Round};

/// Handle to a scene resource (mesh, texture, light...)
pub type ResourceId = u32;

/// Everything a scene builder needs to construct one round's world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldLayout {
    pub left_boundary: f32,
    pub right_boundary: f32,
    pub finish_line_distance: f32,
    pub obstacle_size: f32,
    pub obstacles: Vec<Obstacle>,
    /// Tree trunk base positions, all outside the lane
    pub trees: Vec<Vec3>,
}

impl WorldLayout {
    pub fn for_round(settings: &Settings, obstacles: &[Obstacle], seed: u64) -> Self {
        Self {
            left_boundary: settings.left_boundary,
            right_boundary: settings.right_boundary,
            finish_line_distance: settings.finish_line_distance,
            obstacle_size: settings.obstacle_size,
            obstacles: obstacles.to_vec(),
            trees: scatter_trees(seed, TREE_COUNT),
        }
    }
}

/// Scatter up to `candidates` trees, keeping only those clear of the lane
pub fn scatter_trees(seed: u64, candidates: usize) -> Vec<Vec3> {
    let mut rng = Pcg32::seed_from_u64(seed ^ 0x5EED_7EE5);
    (0..candidates)
        .filter_map(|_| {
            let x = rng.random_range(-TREE_HALF_SPREAD_X..=TREE_HALF_SPREAD_X);
            let z = rng.random_range(-TREE_HALF_SPREAD_Z..=TREE_HALF_SPREAD_Z);
            (x.abs() > TREE_MIN_ABS_X).then(|| Vec3::new(x, 0.0, z))
        })
        .collect()
}

/// Resources created for one round. Must be handed back through
/// `release`; dropping a non-empty arena logs a leak.
#[derive(Debug, Default)]
pub struct WorldArena {
    resources: Vec<ResourceId>,
}

impl WorldArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resource as owned by this round
    pub fn track(&mut self, id: ResourceId) -> ResourceId {
        self.resources.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Release every tracked resource, newest first. Returns how many.
    pub fn release<B: SceneBuilder + ?Sized>(mut self, scene: &mut B) -> usize {
        let resources = std::mem::take(&mut self.resources);
        let count = resources.len();
        for id in resources.into_iter().rev() {
            scene.release(id);
        }
        count
    }
}

impl Drop for WorldArena {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            log::warn!("World arena dropped with {} live resources", self.resources.len());
        }
    }
}

/// Builds and tears down the static world for a round
pub trait SceneBuilder {
    /// Create the world for `layout`, tracking every resource in `arena`
    fn build_world(&mut self, layout: &WorldLayout, arena: &mut WorldArena);

    /// Free a single resource
    fn release(&mut self, id: ResourceId);

    /// Free everything a matching `build_world` created
    fn teardown_world(&mut self, arena: WorldArena) {
        let count = arena.release(self);
        log::debug!("Released {} world resources", count);
    }
}

/// Draws the current frame
pub trait FrameRenderer {
    fn render_frame(&mut self, round: &Round);
}

/// Scene builder that only counts what it would create. Used by the native
/// build, which has no display.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next_id: ResourceId,
    live: HashSet<ResourceId>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources created and not yet released
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn create(&mut self, arena: &mut WorldArena) -> ResourceId {
        self.next_id += 1;
        self.live.insert(self.next_id);
        arena.track(self.next_id)
    }
}

impl SceneBuilder for HeadlessScene {
    fn build_world(&mut self, layout: &WorldLayout, arena: &mut WorldArena) {
        // Lane ground plus the two verges
        for _ in 0..3 {
            self.create(arena);
        }
        for _ in &layout.obstacles {
            self.create(arena);
        }
        // Trunk and foliage per tree
        for _ in &layout.trees {
            self.create(arena);
            self.create(arena);
        }
        log::debug!(
            "Built headless world: {} obstacles, {} trees",
            layout.obstacles.len(),
            layout.trees.len()
        );
    }

    fn release(&mut self, id: ResourceId) {
        if !self.live.remove(&id) {
            log::warn!("Release of unknown resource {}", id);
        }
    }
}

/// Renderer that logs the vehicle position now and then
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameRenderer for LogRenderer {
    fn render_frame(&mut self, round: &Round) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            if let Some(v) = round.vehicle {
                log::debug!(
                    "frame {}: x={:.1} z={:.1} tilt={:.3} distance={:.0}",
                    self.frames,
                    v.position.x,
                    v.position.z,
                    v.tilt,
                    round.distance
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generate_obstacles;

    #[test]
    fn test_trees_outside_lane() {
        let trees = scatter_trees(42, 500);
        assert!(!trees.is_empty());
        assert!(trees.len() < 500);
        for t in &trees {
            assert!(t.x.abs() > TREE_MIN_ABS_X);
            assert!(t.x.abs() <= TREE_HALF_SPREAD_X);
            assert!(t.z.abs() <= TREE_HALF_SPREAD_Z);
        }
        assert_eq!(trees, scatter_trees(42, 500));
    }

    #[test]
    fn test_layout_carries_obstacles() {
        let settings = Settings::default();
        let obstacles = generate_obstacles(&settings, 3);
        let layout = WorldLayout::for_round(&settings, &obstacles, 3);
        assert_eq!(layout.obstacles, obstacles);
        assert_eq!(layout.finish_line_distance, settings.finish_line_distance);
    }

    #[test]
    fn test_arena_release_frees_everything() {
        let settings = Settings::default();
        let layout = WorldLayout::for_round(&settings, &generate_obstacles(&settings, 1), 1);
        let mut scene = HeadlessScene::new();

        let mut arena = WorldArena::new();
        scene.build_world(&layout, &mut arena);
        let built = arena.len();
        assert_eq!(built, 3 + layout.obstacles.len() + 2 * layout.trees.len());
        assert_eq!(scene.live_count(), built);

        scene.teardown_world(arena);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_arenas_are_independent() {
        let settings = Settings::default();
        let layout = WorldLayout::for_round(&settings, &[], 5);
        let mut scene = HeadlessScene::new();

        let mut first = WorldArena::new();
        scene.build_world(&layout, &mut first);
        let mut second = WorldArena::new();
        scene.build_world(&layout, &mut second);

        let second_len = second.len();
        assert_eq!(first.release(&mut scene), second_len);
        assert_eq!(scene.live_count(), second_len);
        second.release(&mut scene);
        assert_eq!(scene.live_count(), 0);
    }
}
