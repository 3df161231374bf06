//! High score leaderboard system
//!
//! Persisted to a JSON file, tracks the top 10 runs.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{RunSummary, WeaponKind};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to access leaderboard file: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt leaderboard json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives the summary of every finished run
pub trait RunRecorder {
    /// Store the run; returns its rank (1-indexed) if it made the board
    fn record(&mut self, summary: &RunSummary) -> Option<usize>;
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    /// Wave reached
    pub wave: u32,
    pub survival_secs: f32,
    pub character: WeaponKind,
    pub victory: bool,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    pub fn from_summary(summary: &RunSummary, timestamp: f64) -> Self {
        Self {
            score: summary.score,
            kills: summary.kills,
            level: summary.level,
            wave: summary.wave,
            survival_secs: summary.survival_secs,
            character: summary.character,
            victory: summary.victory,
            timestamp,
        }
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
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
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add an entry if it qualifies; returns the rank achieved (1-indexed)
    pub fn add_entry(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Sorted descending by score; ties go below earlier entries
        let rank = match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HighScoreError> {
        let json = fs::read_to_string(path.as_ref())?;
        let mut scores: HighScores = serde_json::from_str(&json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Load, falling back to an empty board when the file is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(scores) => scores,
            Err(HighScoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Ignoring leaderboard at {}: {}", path.as_ref().display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighScoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl RunRecorder for HighScores {
    fn record(&mut self, summary: &RunSummary) -> Option<usize> {
        let rank = self.add_entry(HighScoreEntry::from_summary(summary, now_ms()));
        match rank {
            Some(rank) => log::info!("Run placed #{} on the leaderboard", rank),
            None => log::debug!("Run did not qualify for the leaderboard"),
        }
        rank
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// Format survival time as m:ss
pub fn format_duration(secs: f32) -> String {
    let total = secs.max(0.0) as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(score: u64) -> RunSummary {
        RunSummary {
            score,
            kills: 3,
            level: 2,
            wave: 1,
            survival_secs: 42.0,
            character: WeaponKind::Magic,
            victory: false,
        }
    }

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry::from_summary(&summary(score), 0.0)
    }

    #[test]
    fn test_ranks_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_entry(entry(100)), Some(1));
        assert_eq!(scores.add_entry(entry(300)), Some(1));
        assert_eq!(scores.add_entry(entry(200)), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![300, 200, 100]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(&summary(0)), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_board_keeps_top_ten() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.add_entry(entry(s * 10));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(20));
        assert_eq!(scores.potential_rank(1000), Some(1));
        assert_eq!(scores.potential_rank(35), Some(10));
    }

    #[test]
    fn test_recorder_keeps_run_details() {
        let mut scores = HighScores::new();
        assert_eq!(scores.record(&summary(50)), Some(1));
        let e = &scores.entries[0];
        assert_eq!(e.character, WeaponKind::Magic);
        assert_eq!(e.kills, 3);
        assert!(e.timestamp > 0.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("horde-scores-{}.json", std::process::id()));
        let mut scores = HighScores::new();
        scores.add_entry(entry(70));
        scores.add_entry(entry(90));
        scores.save(&path).unwrap();
        let loaded = HighScores::load(&path).unwrap();
        assert_eq!(loaded.entries, scores.entries);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_corrupt_file_falls_back() {
        let dir = std::env::temp_dir();
        let missing = dir.join("horde-scores-does-not-exist.json");
        assert!(HighScores::load_or_default(&missing).is_empty());

        let corrupt = dir.join(format!("horde-scores-bad-{}.json", std::process::id()));
        fs::write(&corrupt, "not json").unwrap();
        assert!(matches!(HighScores::load(&corrupt), Err(HighScoreError::Json(_))));
        assert!(HighScores::load_or_default(&corrupt).is_empty());
        let _ = fs::remove_file(&corrupt);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(125.9), "2:05");
    }
}
