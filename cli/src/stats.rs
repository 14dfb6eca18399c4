//! Aggregate statistics over a batch of AI episodes.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    pub score: u64,
    pub max_tile: u32,
    pub moves: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub episodes: usize,
    pub highest_score: u64,
    pub lowest_score: u64,
    pub average_score: f64,
    pub max_tile_overall: u32,
    pub total_moves: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Returns `None` when no episode was played.
    pub fn from_results(results: &[EpisodeResult], elapsed: Duration) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let total: u64 = results.iter().map(|r| r.score).sum();
        Some(Self {
            episodes: results.len(),
            highest_score: results.iter().map(|r| r.score).max()?,
            lowest_score: results.iter().map(|r| r.score).min()?,
            average_score: total as f64 / results.len() as f64,
            max_tile_overall: results.iter().map(|r| r.max_tile).max()?,
            total_moves: results.iter().map(|r| u64::from(r.moves)).sum(),
            elapsed,
        })
    }

    /// Moves per second across the whole run.
    pub fn moves_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_moves as f64 / secs
        } else {
            0.0
        }
    }
}

/// Comma-separated score series, one entry per episode in play order.
pub fn score_series(results: &[EpisodeResult]) -> String {
    results
        .iter()
        .map(|r| r.score.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
