//! Local leaderboard
//!
//! Persisted as a JSON array, keeps the top 10 scores. Rows read back from
//! storage or from a remote server go through the same sanitizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persistence::{self, Storage, keys};

/// Maximum number of rows to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest player name kept, in characters
pub const MAX_NAME_LEN: usize = 12;

/// Name used when none is given
pub const DEFAULT_NAME: &str = "Guest";

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub score: u64,
    /// Date key (`YYYY-MM-DD`) the score was set, may be empty
    pub date: String,
}

impl LeaderboardRow {
    pub fn new(name: &str, score: u64, date: &str) -> Self {
        Self {
            name: clean_name(name),
            score,
            date: date.to_string(),
        }
    }
}

/// Trim and cut a name to [`MAX_NAME_LEN`] characters; empty becomes [`DEFAULT_NAME`]
pub fn clean_name(name: &str) -> String {
    let cut: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if cut.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cut
    }
}

/// Parse a numeric score from a JSON number or numeric string
fn parse_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then_some(score)
}

/// Convert untrusted JSON into rows. Returns `None` unless `value` is an
/// array; rows without a finite score are dropped and at most
/// [`MAX_HIGH_SCORES`] are kept, in input order.
pub fn sanitize_rows(value: &Value) -> Option<Vec<LeaderboardRow>> {
    let rows = value.as_array()?;
    Some(
        rows.iter()
            .filter_map(|row| {
                let score = parse_score(row.get("score")?)?;
                let name = row.get("name").and_then(Value::as_str).unwrap_or("");
                let date = row.get("date").and_then(Value::as_str).unwrap_or("");
                Some(LeaderboardRow::new(name, score.max(0.0).floor() as u64, date))
            })
            .take(MAX_HIGH_SCORES)
            .collect(),
    )
}

/// Local leaderboard, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<LeaderboardRow>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a row (if it qualifies). Returns the rank achieved (1-indexed).
    /// Ties keep the earlier row ahead.
    pub fn add(&mut self, row: LeaderboardRow) -> Option<usize> {
        if !self.qualifies(row.score) {
            return None;
        }

        let pos = self
            .entries
            .iter()
            .position(|e| row.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, row);

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    /// Remove every row
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from storage; missing or malformed data gives an empty board
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::get_json::<Value>(storage, keys::LEADERBOARD) {
            Ok(Some(value)) => {
                let mut entries = sanitize_rows(&value).unwrap_or_default();
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                log::info!("Loaded {} local leaderboard rows", entries.len());
                Self { entries }
            }
            Ok(None) => {
                log::info!("No local leaderboard found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding local leaderboard: {}", e);
                Self::new()
            }
        }
    }

    /// Save to storage
    pub fn save(&self, storage: &mut dyn Storage) {
        match persistence::set_json(storage, keys::LEADERBOARD, &self.entries) {
            Ok(()) => log::info!("Local leaderboard saved ({} rows)", self.entries.len()),
            Err(e) => log::warn!("Failed to save local leaderboard: {}", e),
        }
    }

    /// Clear the board and its stored copy
    pub fn reset_stored(&mut self, storage: &mut dyn Storage) {
        self.reset();
        persistence::clear(storage, keys::LEADERBOARD);
        log::info!("Local leaderboard reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use serde_json::json;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Ada  "), "Ada");
        assert_eq!(clean_name(""), "Guest");
        assert_eq!(clean_name("   "), "Guest");
        assert_eq!(clean_name("ABCDEFGHIJKLMNOP"), "ABCDEFGHIJKL");
        assert_eq!(clean_name("ñññññññññññññ").chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_sanitize_filters_and_caps() {
        let mut rows: Vec<Value> = vec![
            json!({"name": "A", "score": 10.7, "date": "2024-01-01"}),
            json!({"name": "B", "score": "not a number"}),
            json!({"score": "42"}),
            json!({"name": "C"}),
            json!(null),
        ];
        for i in 0..20 {
            rows.push(json!({"name": "X", "score": i}));
        }

        let clean = sanitize_rows(&Value::Array(rows)).unwrap();
        assert_eq!(clean.len(), MAX_HIGH_SCORES);
        assert_eq!(clean[0], LeaderboardRow::new("A", 10, "2024-01-01"));
        assert_eq!(clean[1].name, "Guest");
        assert_eq!(clean[1].score, 42);
        assert_eq!(clean[1].date, "");

        assert!(sanitize_rows(&json!({"rows": []})).is_none());
    }

    #[test]
    fn test_add_keeps_sorted_and_capped() {
        let mut board = HighScores::new();
        for score in [50, 10, 30, 70, 20, 60, 40, 80, 90, 100] {
            board.add(LeaderboardRow::new("P", score, ""));
        }
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(100));
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));

        assert!(!board.qualifies(5));
        assert_eq!(board.add(LeaderboardRow::new("Q", 5, "")), None);
        assert_eq!(board.add(LeaderboardRow::new("Q", 55, "")), Some(6));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_ties_keep_earlier_row_first() {
        let mut board = HighScores::new();
        board.add(LeaderboardRow::new("first", 10, ""));
        board.add(LeaderboardRow::new("second", 10, ""));
        assert_eq!(board.entries[0].name, "first");
    }

    #[test]
    fn test_load_save_reset() {
        let mut storage = MemoryStorage::new();
        assert!(HighScores::load(&storage).is_empty());

        let mut board = HighScores::new();
        board.add(LeaderboardRow::new("Ada", 120, "2024-01-01"));
        board.add(LeaderboardRow::new("Bob", 340, "2024-01-02"));
        board.save(&mut storage);

        let mut loaded = HighScores::load(&storage);
        assert_eq!(loaded.entries, board.entries);

        loaded.reset_stored(&mut storage);
        assert!(loaded.is_empty());
        assert!(HighScores::load(&storage).is_empty());
    }

    #[test]
    fn test_malformed_storage_is_discarded() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::LEADERBOARD, "{not json").unwrap();
        assert!(HighScores::load(&storage).is_empty());

        storage
            .set(keys::LEADERBOARD, r#"[{"name":"A","score":5},{"name":"B","score":9}]"#)
            .unwrap();
        let board = HighScores::load(&storage);
        assert_eq!(board.top_score(), Some(9));
    }
}
