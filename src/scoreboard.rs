//! Best-per-player scoreboard
//!
//! Persisted to a single storage slot as a JSON array of entries. Each update
//! merges the stored entries with the current session's results, keeps one
//! entry per player name (the highest `time + distance`), and writes the
//! whole set back.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};
use crate::sim::Score;

/// A single scoreboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: Score,
    #[serde(default)]
    pub finished: bool,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: Score) -> Self {
        Self {
            name: name.into(),
            score,
            finished: true,
        }
    }
}

/// An entry positioned for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry<'a> {
    /// 1-indexed
    pub rank: usize,
    pub entry: &'a ScoreEntry,
    /// Overall best entry
    pub highlight: bool,
}

/// Deduplicated leaderboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    /// One entry per name, in first-seen order
    entries: Vec<ScoreEntry>,
    /// Index of the best entry
    highlight: Option<usize>,
}

impl Scoreboard {
    /// Storage slot name
    pub const STORAGE_KEY: &'static str = "lane_racer_scoreboard";

    /// Create empty scoreboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries, deduplicating by name
    pub fn from_entries(entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        Self::merge(Vec::<ScoreEntry>::new(), entries)
    }

    /// Merge persisted entries with new results.
    ///
    /// Entries are visited persisted-first; a later entry replaces an earlier
    /// one with the same name only if its combined score is strictly higher.
    pub fn merge(
        persisted: impl IntoIterator<Item = ScoreEntry>,
        fresh: impl IntoIterator<Item = ScoreEntry>,
    ) -> Self {
        let mut entries: Vec<ScoreEntry> = Vec::new();

        for entry in persisted.into_iter().chain(fresh) {
            match entries.iter_mut().find(|e| e.name == entry.name) {
                Some(existing) => {
                    if entry.score.combined() > existing.score.combined() {
                        *existing = entry;
                    }
                }
                None => entries.push(entry),
            }
        }

        let highlight = best_index(&entries);
        Self { entries, highlight }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a player name
    pub fn get(&self, name: &str) -> Option<&ScoreEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// The highlighted (highest combined score) entry
    pub fn best(&self) -> Option<&ScoreEntry> {
        self.highlight.map(|i| &self.entries[i])
    }

    /// Entries sorted by combined score, best first. Ties keep first-seen order.
    pub fn ranked(&self) -> Vec<RankedEntry<'_>> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .score
                .combined()
                .partial_cmp(&self.entries[a].score.combined())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        order
            .into_iter()
            .enumerate()
            .map(|(pos, i)| RankedEntry {
                rank: pos + 1,
                entry: &self.entries[i],
                highlight: self.highlight == Some(i),
            })
            .collect()
    }

    /// Load the persisted scoreboard. Missing or malformed data is empty.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let json = match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No scoreboard found, starting fresh");
                return Self::new();
            }
            Err(e) => {
                log::warn!("Scoreboard unavailable: {}", e);
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<ScoreEntry>>(&json) {
            Ok(entries) => {
                let board = Self::from_entries(entries);
                log::info!("Loaded {} scoreboard entries", board.len());
                board
            }
            Err(e) => {
                log::warn!("Ignoring malformed scoreboard: {}", e);
                Self::new()
            }
        }
    }

    /// Overwrite the persisted scoreboard with this one
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Scoreboard saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load, merge in results with a nonzero score, and persist.
    ///
    /// A failed write is logged; the merged board is returned either way.
    pub fn update(
        store: &mut impl KeyValueStore,
        results: impl IntoIterator<Item = ScoreEntry>,
    ) -> Self {
        let persisted = Self::load(&*store);
        let fresh = results.into_iter().filter(|e| !e.score.is_zero());
        let merged = Self::merge(persisted.entries, fresh);

        if let Err(e) = merged.save(store) {
            log::warn!("Failed to save scoreboard: {}", e);
        }
        merged
    }

    /// Remove all persisted entries
    pub fn clear(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        store.remove(Self::STORAGE_KEY)?;
        log::info!("Scoreboard cleared");
        Ok(())
    }
}

/// Index of the highest combined score; the first one wins ties
fn best_index(entries: &[ScoreEntry]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .reduce(|best, cur| {
            if cur.1.score.combined() > best.1.score.combined() {
                cur
            } else {
                best
            }
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn entry(name: &str, time: f64, distance: f64) -> ScoreEntry {
        ScoreEntry::new(name, Score::new(time, distance))
    }

    #[test]
    fn test_merge_keeps_best_per_name() {
        let board = Scoreboard::merge(
            vec![entry("ana", 10.0, 500.0), entry("bo", 5.0, 100.0)],
            vec![entry("ana", 12.0, 800.0), entry("bo", 1.0, 50.0)],
        );
        assert_eq!(board.len(), 2);
        assert_eq!(board.get("ana").map(|e| e.score.distance), Some(800.0));
        assert_eq!(board.get("bo").map(|e| e.score.distance), Some(100.0));
    }

    #[test]
    fn test_merge_prefers_persisted_on_lower_or_equal() {
        let board = Scoreboard::merge(vec![entry("a", 4.0, 6.0)], vec![entry("a", 2.0, 3.0)]);
        assert_eq!(board.entries(), &[entry("a", 4.0, 6.0)]);

        // Same combined score, different split: persisted stays
        let board = Scoreboard::merge(vec![entry("a", 4.0, 6.0)], vec![entry("a", 6.0, 4.0)]);
        assert_eq!(board.entries(), &[entry("a", 4.0, 6.0)]);
    }

    #[test]
    fn test_merge_with_itself_is_idempotent() {
        let entries = vec![entry("a", 1.0, 10.0), entry("b", 2.0, 20.0), entry("c", 0.5, 5.0)];
        let board = Scoreboard::from_entries(entries.clone());
        let merged = Scoreboard::merge(board.entries().to_vec(), board.entries().to_vec());
        assert_eq!(merged, board);
        assert_eq!(merged.entries(), entries.as_slice());
    }

    #[test]
    fn test_highlight_first_of_ties() {
        let board = Scoreboard::from_entries(vec![
            entry("a", 0.0, 10.0),
            entry("b", 5.0, 15.0),
            entry("c", 10.0, 10.0),
        ]);
        assert_eq!(board.best().map(|e| e.name.as_str()), Some("b"));

        let ranked = board.ranked();
        assert_eq!(ranked[0].entry.name, "b");
        assert!(ranked[0].highlight);
        assert_eq!(ranked[1].entry.name, "c");
        assert!(!ranked[1].highlight);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(ranked.iter().filter(|r| r.highlight).count(), 1);
    }

    #[test]
    fn test_empty_board() {
        let board = Scoreboard::new();
        assert!(board.is_empty());
        assert!(board.best().is_none());
        assert!(board.ranked().is_empty());
    }

    #[test]
    fn test_update_persists_and_filters_zero_scores() {
        let mut store = MemoryStore::new();
        let board = Scoreboard::update(
            &mut store,
            vec![entry("a", 3.0, 300.0), ScoreEntry {
                name: "waiting".into(),
                score: Score::default(),
                finished: false,
            }],
        );
        assert_eq!(board.len(), 1);

        let reloaded = Scoreboard::load(&store);
        assert_eq!(reloaded, board);

        // Second session merges over the first
        let board = Scoreboard::update(&mut store, vec![entry("a", 2.0, 100.0), entry("b", 1.0, 50.0)]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.get("a").map(|e| e.score.combined()), Some(303.0));
    }

    #[test]
    fn test_persisted_format_is_plain_array() {
        let mut store = MemoryStore::new();
        Scoreboard::from_entries(vec![entry("a", 1.5, 20.0)])
            .save(&mut store)
            .unwrap();

        let json = store.get(Scoreboard::STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "name": "a", "score": { "time": 1.5, "distance": 20.0 }, "finished": true }
            ])
        );
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let mut store = MemoryStore::new();
        store.set(Scoreboard::STORAGE_KEY, "{ nope").unwrap();
        assert!(Scoreboard::load(&store).is_empty());

        store.set(Scoreboard::STORAGE_KEY, r#"{"name": "a"}"#).unwrap();
        assert!(Scoreboard::load(&store).is_empty());
    }

    #[test]
    fn test_load_dedups_legacy_duplicates() {
        let mut store = MemoryStore::new();
        store
            .set(
                Scoreboard::STORAGE_KEY,
                r#"[{"name":"a","score":{"time":1,"distance":2}},
                    {"name":"a","score":{"time":1,"distance":9}}]"#,
            )
            .unwrap();
        let board = Scoreboard::load(&store);
        assert_eq!(board.len(), 1);
        assert_eq!(board.get("a").map(|e| e.score.distance), Some(9.0));
    }

    #[test]
    fn test_clear_removes_slot() {
        let mut store = MemoryStore::new();
        Scoreboard::update(&mut store, vec![entry("a", 1.0, 1.0)]);
        Scoreboard::clear(&mut store).unwrap();
        assert!(store.get(Scoreboard::STORAGE_KEY).unwrap().is_none());
        assert!(Scoreboard::load(&store).is_empty());
    }
}
