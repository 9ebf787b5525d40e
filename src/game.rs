//! Game orchestrator
//!
//! Owns the session, the round, the input sampler and the external
//! collaborators, and runs one frame at a time. Front ends (the browser build
//! and the native headless driver) only feed it key events, timestamps and
//! UI requests.

use crate::consts::MAX_FRAME_DT;
use crate::persistence::{KeyValueStore, StorageError};
use crate::session::{Session, SessionEvent};
use crate::settings::Settings;
use crate::sim::{InputSampler, KeyEvent, Round, generate_obstacles, tick};
use crate::world::{FrameRenderer, SceneBuilder, WorldArena, WorldLayout};

/// A running game instance
pub struct Game<W: SceneBuilder, R: FrameRenderer, S: KeyValueStore> {
    settings: Settings,
    session: Session<S>,
    round: Round,
    input: InputSampler,
    scene: W,
    renderer: R,
    /// World resources of the round in progress
    arena: Option<WorldArena>,
    /// Base seed; each round derives its own layout seed from it
    seed: u64,
    rounds_started: u64,
}

impl<W: SceneBuilder, R: FrameRenderer, S: KeyValueStore> Game<W, R, S> {
    pub fn new(settings: Settings, scene: W, renderer: R, store: S, seed: u64) -> Self {
        Self {
            settings,
            session: Session::new(store),
            round: Round::new(),
            input: InputSampler::new(),
            scene,
            renderer,
            arena: None,
            seed,
            rounds_started: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn scene(&self) -> &W {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.round.is_running()
    }

    /// Queue a key transition for the next frame
    pub fn key_event(&mut self, event: KeyEvent) {
        self.input.push(event);
    }

    /// The vehicle asset finished loading
    pub fn attach_vehicle(&mut self) {
        self.round.attach_vehicle(&self.settings);
    }

    pub fn register_player(&mut self, name: &str, total_expected: usize) -> Option<SessionEvent> {
        self.session.register_player(name, total_expected)
    }

    /// Start the next player's round, if any
    pub fn start(&mut self, now_ms: f64) -> Option<SessionEvent> {
        if self.round.is_running() {
            log::warn!("Ignoring start request: a round is already running");
            return None;
        }
        let event = self.session.start_next_player()?;
        self.handle_event(event, now_ms)
    }

    /// Simulate and draw one frame.
    ///
    /// Returns the session event triggered when the round ends on this frame.
    pub fn frame(&mut self, dt: f32, now_ms: f64) -> Option<SessionEvent> {
        if !self.round.is_running() {
            return None;
        }

        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let result = tick(&mut self.round, &mut self.input, &self.settings, dt, now_ms);
        self.renderer.render_frame(&self.round);

        let score = result?;
        self.end_round();
        let event = self.session.on_round_finished(score)?;
        self.handle_event(event, now_ms)
    }

    /// Drop all players. A round in progress is abandoned.
    pub fn reset_session(&mut self) {
        if self.round.is_running() {
            log::info!("Abandoning round in progress");
            self.end_round();
            let vehicle = self.round.vehicle.take();
            self.round = Round::new();
            self.round.vehicle = vehicle;
        }
        self.input.clear();
        self.session.reset();
    }

    pub fn clear_scoreboard(&mut self) -> Result<(), StorageError> {
        self.session.clear_scoreboard()
    }

    fn handle_event(&mut self, event: SessionEvent, now_ms: f64) -> Option<SessionEvent> {
        if let SessionEvent::StartRound { .. } = event {
            self.begin_round(now_ms);
        }
        Some(event)
    }

    fn begin_round(&mut self, now_ms: f64) {
        let seed = self.seed.wrapping_add(self.rounds_started);
        self.rounds_started += 1;

        let obstacles = generate_obstacles(&self.settings, seed);
        let layout = WorldLayout::for_round(&self.settings, &obstacles, seed);

        if let Some(stale) = self.arena.take() {
            self.scene.teardown_world(stale);
        }
        let mut arena = WorldArena::new();
        self.scene.build_world(&layout, &mut arena);
        self.arena = Some(arena);

        self.input.clear();
        self.round.start(&self.settings, obstacles, now_ms);
        if !self.round.has_vehicle() {
            log::warn!("Round started before the vehicle finished loading");
        }
    }

    fn end_round(&mut self) {
        if let Some(arena) = self.arena.take() {
            self.scene.teardown_world(arena);
        }
        self.round.clear_obstacles();
    }
}
