//! High score boards
//!
//! One top-10 board per mini-game, persisted together as a single JSON
//! document. Boards are sorted descending by score; ranks are 1-indexed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::games::GameKind;
use crate::StoreError;

/// Maximum entries per board
pub const MAX_ENTRIES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    /// Final wave/sprint/level of the run
    pub level: u32,
    /// Unix timestamp (seconds) when achieved
    pub timestamp: u64,
}

/// Top-10 board for one game
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Board {
    pub entries: Vec<ScoreEntry>,
}

impl Board {
    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed), `None` if it doesn't qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score, keeping the board sorted and trimmed.
    /// Returns the rank achieved, or `None` if it didn't qualify.
    pub fn add_score(&mut self, score: u64, level: u32, timestamp: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry {
            score,
            level,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All boards, keyed by game slug for a stable JSON shape
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    boards: BTreeMap<String, Board>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, kind: GameKind) -> Option<&Board> {
        self.boards.get(kind.slug())
    }

    fn board_mut(&mut self, kind: GameKind) -> &mut Board {
        self.boards.entry(kind.slug().to_string()).or_default()
    }

    /// Record a finished run. Returns the rank achieved, if any.
    pub fn record(
        &mut self,
        kind: GameKind,
        score: u64,
        level: u32,
        timestamp: u64,
    ) -> Option<usize> {
        self.board_mut(kind).add_score(score, level, timestamp)
    }

    /// Load boards from a JSON file; a missing file is an empty set
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("no high scores at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("loaded high scores from {}", path.display());
        Ok(scores)
    }

    /// Save boards to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("high scores saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_takes_any_nonzero_score() {
        let board = Board::default();
        assert!(board.qualifies(1));
        assert!(!board.qualifies(0));
        assert_eq!(board.potential_rank(100), Some(1));
    }

    #[test]
    fn scores_keep_descending_order() {
        let mut board = Board::default();
        assert_eq!(board.add_score(100, 2, 0), Some(1));
        assert_eq!(board.add_score(300, 4, 1), Some(1));
        assert_eq!(board.add_score(200, 3, 2), Some(2));

        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
    }

    #[test]
    fn full_board_drops_the_weakest() {
        let mut board = Board::default();
        for i in 1..=MAX_ENTRIES as u64 {
            board.add_score(i * 10, 1, i);
        }
        assert!(!board.qualifies(5));
        assert_eq!(board.add_score(5, 1, 0), None);

        assert_eq!(board.add_score(55, 1, 0), Some(6));
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries.last().unwrap().score, 20);
    }

    #[test]
    fn ties_rank_below_existing_entries() {
        let mut board = Board::default();
        board.add_score(100, 1, 0);
        assert_eq!(board.add_score(100, 1, 1), Some(2));
    }

    #[test]
    fn boards_are_per_game() {
        let mut scores = HighScores::new();
        scores.record(GameKind::Snake, 50, 1, 0);
        scores.record(GameKind::Backlog, 900, 2, 0);

        assert_eq!(scores.board(GameKind::Snake).unwrap().top_score(), Some(50));
        assert_eq!(
            scores.board(GameKind::Backlog).unwrap().top_score(),
            Some(900)
        );
        assert!(scores.board(GameKind::Runner).is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let mut scores = HighScores::new();
        scores.record(GameKind::Standup, 640, 6, 1_700_000_000);

        let json = serde_json::to_string(&scores).unwrap();
        let back: HighScores = serde_json::from_str(&json).unwrap();
        let board = back.board(GameKind::Standup).unwrap();
        assert_eq!(board.entries[0].score, 640);
        assert_eq!(board.entries[0].level, 6);
    }
}
