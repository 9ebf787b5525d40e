//! Multi-player session
//!
//! Players register up front, then play one round each in registration
//! order. Each finished round is written onto its player and merged into the
//! persisted scoreboard before the next player is started.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};
use crate::scoreboard::{ScoreEntry, Scoreboard};
use crate::sim::Score;

/// A registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: Score,
    pub finished: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: Score::default(),
            finished: false,
        }
    }
}

impl From<&Player> for ScoreEntry {
    fn from(player: &Player) -> Self {
        ScoreEntry {
            name: player.name.clone(),
            score: player.score,
            finished: player.finished,
        }
    }
}

/// Signals for the UI and the round driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Every expected player has registered
    ReadyToStart,
    /// Start a round for the player at `index`
    StartRound { index: usize, name: String },
    /// No unfinished player is left at the cursor
    SessionComplete,
    /// The last round just finished; show the final standings
    FinalScores,
}

/// Player queue plus the persisted scoreboard
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    players: Vec<Player>,
    cursor: usize,
    expected: usize,
    /// A round was started for the player at the cursor and has not finished
    in_round: bool,
    scoreboard: Scoreboard,
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    /// New session; loads the persisted scoreboard from `store`
    pub fn new(store: S) -> Self {
        let scoreboard = Scoreboard::load(&store);
        Self {
            players: Vec::new(),
            cursor: 0,
            expected: 0,
            in_round: false,
            scoreboard,
            store,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Index of the player whose round is next (or in progress)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.cursor)
    }

    /// Number of players announced for this session
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_ready(&self) -> bool {
        self.expected > 0 && self.players.len() >= self.expected
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the current player's round is in progress
    pub fn in_round(&self) -> bool {
        self.in_round
    }

    /// Add a player with a zeroed score.
    ///
    /// Returns `ReadyToStart` when this registration brings the roster to
    /// `total_expected`.
    pub fn register_player(&mut self, name: &str, total_expected: usize) -> Option<SessionEvent> {
        self.expected = total_expected;
        self.players.push(Player::new(name));
        log::info!(
            "Registered player {} ({}/{})",
            name,
            self.players.len(),
            total_expected
        );

        if self.players.len() == total_expected {
            log::info!("All players registered. Ready to start!");
            Some(SessionEvent::ReadyToStart)
        } else {
            None
        }
    }

    /// Start the player at the cursor if they have not played yet.
    ///
    /// Returns `None` when nobody is registered or a round is already in
    /// progress.
    pub fn start_next_player(&mut self) -> Option<SessionEvent> {
        if self.players.is_empty() {
            log::debug!("Ignoring start: no players registered");
            return None;
        }
        if self.in_round {
            log::warn!("Ignoring start: a round is already in progress");
            return None;
        }

        match self.players.get(self.cursor) {
            Some(player) if !player.finished => {
                log::info!("Starting game for {}", player.name);
                self.in_round = true;
                Some(SessionEvent::StartRound {
                    index: self.cursor,
                    name: player.name.clone(),
                })
            }
            _ => {
                log::info!("All players have played or game queue is complete.");
                Some(SessionEvent::SessionComplete)
            }
        }
    }

    /// Record the current player's result and move on.
    ///
    /// Returns the next `StartRound`, or `FinalScores` after the last player.
    /// `None` if no round was started.
    pub fn on_round_finished(&mut self, score: Score) -> Option<SessionEvent> {
        if !self.in_round {
            log::warn!("Ignoring round result: no round in progress");
            return None;
        }
        self.in_round = false;
        let Some(player) = self.players.get_mut(self.cursor) else {
            log::warn!("Ignoring round result: no current player");
            return None;
        };

        player.score = score;
        player.finished = true;
        log::info!(
            "{} finished: time={:.2}s distance={}",
            player.name,
            score.time,
            score.distance
        );

        self.scoreboard = Scoreboard::update(
            &mut self.store,
            self.players.iter().map(ScoreEntry::from),
        );
        self.cursor += 1;

        if self.cursor < self.players.len() {
            self.start_next_player()
        } else {
            log::info!("Game over. Displaying final scores.");
            Some(SessionEvent::FinalScores)
        }
    }

    /// Forget all players; the persisted scoreboard is untouched
    pub fn reset(&mut self) {
        self.players.clear();
        self.cursor = 0;
        self.expected = 0;
        self.in_round = false;
        log::info!("Session reset");
    }

    /// Delete the persisted scoreboard
    pub fn clear_scoreboard(&mut self) -> Result<(), StorageError> {
        Scoreboard::clear(&mut self.store)?;
        self.scoreboard = Scoreboard::new();
        Ok(())
    }
}
