//! High score leaderboard
//!
//! Persisted to a JSON file beside the binary, tracks the top 10 runs.
//! The file is a bare array of entries so it stays hand-editable.

use std::fs;

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

/// Leaderboard file name, resolved against the working directory
pub const LEADERBOARD_FILE: &str = "snake_leaderboard.json";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player's display name
    pub name: String,
    /// Final score of the run
    pub score: u32,
}

/// Top-score table, kept sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    /// Ties rank after the entries already on the board.
    pub fn add_score(&mut self, name: &str, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry { name: name.to_string(), score };

        // Find insertion point (sorted descending by score)
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

        // Trim to max size
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);

        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard from disk. A missing or unreadable file is
    /// not an error; the run starts with an empty board.
    pub fn load() -> Self {
        match fs::read_to_string(LEADERBOARD_FILE) {
            Ok(json) => match serde_json::from_str::<Leaderboard>(&json) {
                Ok(board) => {
                    log::info!("loaded {} leaderboard entries", board.entries.len());
                    board
                }
                Err(err) => {
                    log::warn!("leaderboard file is malformed, starting fresh: {err}");
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("no leaderboard file, starting fresh");
                Self::new()
            }
        }
    }

    /// Save the leaderboard to disk, best effort.
    pub fn save(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = fs::write(LEADERBOARD_FILE, json) {
                    log::warn!("failed to save leaderboard: {err}");
                } else {
                    log::info!("leaderboard saved ({} entries)", self.entries.len());
                }
            }
            Err(err) => log::warn!("failed to serialize leaderboard: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board_of(scores: &[u32]) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (i, s) in scores.iter().enumerate() {
            board.add_score(&format!("p{i}"), *s);
        }
        board
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let board = Leaderboard::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn test_full_board_requires_beating_the_tail() {
        let board = board_of(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        assert_eq!(board.entries.len(), MAX_LEADERBOARD_ENTRIES);
        assert!(!board.qualifies(10), "equal to the tail is not enough");
        assert!(board.qualifies(11));
    }

    #[test]
    fn test_add_score_reports_rank() {
        let mut board = board_of(&[30, 20, 10]);
        assert_eq!(board.add_score("mid", 25), Some(2));
        assert_eq!(board.entries[1].name, "mid");
        assert_eq!(board.add_score("top", 99), Some(1));
        assert_eq!(board.top_score(), Some(99));
    }

    #[test]
    fn test_ties_rank_after_existing_equal_scores() {
        let mut board = board_of(&[20, 20, 10]);
        assert_eq!(board.add_score("late", 20), Some(3));
        assert_eq!(board.entries[2].name, "late");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut board = board_of(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);
        assert_eq!(board.add_score("new", 55), Some(6));
        assert_eq!(board.entries.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20), "old tail dropped");
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let mut board = Leaderboard::new();
        board.add_score("ada", 5);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"[{"name":"ada","score":5}]"#);

        let parsed: Leaderboard = serde_json::from_str(r#"[{"name":"bob","score":7}]"#).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.top_score(), Some(7));
    }

    #[test]
    fn test_rank_matches_potential_rank() {
        let mut board = board_of(&[40, 30, 20, 10]);
        let predicted = board.potential_rank(35);
        assert_eq!(board.add_score("x", 35), predicted);
    }

    proptest! {
        #[test]
        fn test_board_stays_sorted_and_capped(
            scores in prop::collection::vec(0u32..500, 0..40),
        ) {
            let mut board = Leaderboard::new();
            for (i, s) in scores.iter().enumerate() {
                board.add_score(&format!("p{i}"), *s);
            }
            prop_assert!(board.entries.len() <= MAX_LEADERBOARD_ENTRIES);
            for pair in board.entries.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for e in &board.entries {
                prop_assert!(e.score > 0);
            }
        }
    }
}
