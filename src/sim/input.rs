//! Keyboard input sampling
//!
//! Raw key events are queued as they arrive and applied at the start of a
//! frame, so a frame always sees one consistent snapshot. Feeding a scripted
//! event list replays a run exactly.

use std::collections::{HashMap, VecDeque};

/// Gameplay actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Accelerate,
    Brake,
}

impl Action {
    /// Lowercase key identifiers bound to this action (arrow key and WASD)
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Action::Left => &["arrowleft", "a"],
            Action::Right => &["arrowright", "d"],
            Action::Accelerate => &["arrowup", "w"],
            Action::Brake => &["arrowdown", "s"],
        }
    }
}

/// A raw key transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down(String),
    Up(String),
}

impl KeyEvent {
    pub fn down(key: &str) -> Self {
        KeyEvent::Down(key.to_string())
    }

    pub fn up(key: &str) -> Self {
        KeyEvent::Up(key.to_string())
    }
}

/// Control state for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub brake: bool,
}

/// Tracks which keys are currently held
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    held: HashMap<String, bool>,
    pending: VecDeque<KeyEvent>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event; it takes effect at the next `sample`
    pub fn push(&mut self, event: KeyEvent) {
        self.pending.push_back(event);
    }

    /// Apply an event immediately
    pub fn apply(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Down(key) => self.held.insert(key.to_lowercase(), true),
            KeyEvent::Up(key) => self.held.insert(key.to_lowercase(), false),
        };
    }

    /// Whether a key is held (case-insensitive, false for unseen keys)
    pub fn pressed(&self, key: &str) -> bool {
        self.held
            .get(&key.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Whether any key bound to the action is held
    pub fn active(&self, action: Action) -> bool {
        action.keys().iter().any(|key| self.pressed(key))
    }

    /// Drain queued events and return the resulting control state
    pub fn sample(&mut self) -> ControlState {
        while let Some(event) = self.pending.pop_front() {
            self.apply(&event);
        }
        self.snapshot()
    }

    /// Control state from currently held keys, without draining the queue
    pub fn snapshot(&self) -> ControlState {
        ControlState {
            left: self.active(Action::Left),
            right: self.active(Action::Right),
            accelerate: self.active(Action::Accelerate),
            brake: self.active(Action::Brake),
        }
    }

    /// Release every key and drop queued events
    pub fn clear(&mut self) {
        self.held.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_key_is_not_pressed() {
        let input = InputSampler::new();
        assert!(!input.pressed("q"));
        assert_eq!(input.snapshot(), ControlState::default());
    }

    #[test]
    fn test_case_insensitive_keys() {
        let mut input = InputSampler::new();
        input.apply(&KeyEvent::down("ArrowLeft"));
        assert!(input.pressed("arrowleft"));
        assert!(input.pressed("ARROWLEFT"));

        input.apply(&KeyEvent::up("ARROWLEFT"));
        assert!(!input.pressed("ArrowLeft"));
    }

    #[test]
    fn test_aliases_map_to_same_action() {
        let mut input = InputSampler::new();
        input.apply(&KeyEvent::down("D"));
        assert!(input.active(Action::Right));

        input.apply(&KeyEvent::up("d"));
        input.apply(&KeyEvent::down("ArrowRight"));
        assert!(input.active(Action::Right));
        assert!(!input.active(Action::Left));
    }

    #[test]
    fn test_queued_events_apply_on_sample() {
        let mut input = InputSampler::new();
        input.push(KeyEvent::down("w"));
        assert!(!input.active(Action::Accelerate));

        let state = input.sample();
        assert!(state.accelerate);
        assert!(!state.brake);

        // Down then up within one frame leaves the key released
        input.push(KeyEvent::down("s"));
        input.push(KeyEvent::up("s"));
        assert!(!input.sample().brake);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputSampler::new();
        input.apply(&KeyEvent::down("a"));
        input.push(KeyEvent::down("d"));
        input.clear();
        assert_eq!(input.sample(), ControlState::default());
    }
}
