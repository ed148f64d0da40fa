//! Persisted training progress.
//!
//! A checkpoint is the generation counter, the high score and the approximator
//! weights. Next to it lives an append-only log with one [`TrainingRecord`] per
//! finished episode. Loads never fail: missing or unreadable artifacts yield
//! their defaults (generation 1, high score 0, no weights). Saves overwrite the
//! whole value.

use std::{io, path::PathBuf};

use chrono::{DateTime, Utc};
use dinoq_agent::approximator::WeightsBlob;
use serde::{Deserialize, Serialize};

pub use self::{file_store::*, memory_store::*};

mod file_store;
mod memory_store;

/// Generation counter of a fresh run.
pub const FIRST_GENERATION: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// The next generation to play.
    pub generation: u64,
    pub high_score: u64,
    pub weights: Option<WeightsBlob>,
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self {
            generation: FIRST_GENERATION,
            high_score: 0,
            weights: None,
        }
    }
}

/// Summary of one finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub generation: u64,
    pub score: u64,
    pub last_step_reward: f32,
    #[serde(rename = "finalReward")]
    pub cumulative_reward: f32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("failed to write {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to serialize {}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("store rejected the write")]
    Rejected,
}

/// Load-or-default / whole-value-save storage of training progress.
pub trait CheckpointStore {
    fn load_generation(&self) -> u64;
    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError>;

    fn load_high_score(&self) -> u64;
    fn save_high_score(&mut self, high_score: u64) -> Result<(), StoreError>;

    fn load_weights(&self) -> Option<WeightsBlob>;
    fn save_weights(&mut self, weights: &WeightsBlob) -> Result<(), StoreError>;

    fn append_record(&mut self, record: TrainingRecord) -> Result<(), StoreError>;
    fn load_records(&self) -> Vec<TrainingRecord>;

    fn load_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            generation: self.load_generation(),
            high_score: self.load_high_score(),
            weights: self.load_weights(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

impl ScoreStats {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_scores<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut count = 0u64;
        let mut sum = 0u128;
        let mut min = u64::MAX;
        let mut max = 0;
        for score in scores {
            count += 1;
            sum += u128::from(score);
            min = min.min(score);
            max = max.max(score);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum as f64 / count as f64,
        })
    }
}

/// Overview of a training log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub episodes: usize,
    pub last_generation: Option<u64>,
    pub best: Option<TrainingRecord>,
    /// Statistics over the `window` most recent records.
    pub recent: Option<ScoreStats>,
    pub window: usize,
}

impl RecordSummary {
    #[must_use]
    pub fn new(records: &[TrainingRecord], window: usize) -> Self {
        let best = records.iter().max_by_key(|r| r.score).cloned();
        let start = records.len().saturating_sub(window);
        let recent = ScoreStats::from_scores(records[start..].iter().map(|r| r.score));
        Self {
            episodes: records.len(),
            last_generation: records.last().map(|r| r.generation),
            best,
            recent,
            window: records.len() - start,
        }
    }
}
