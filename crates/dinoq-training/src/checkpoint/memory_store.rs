use dinoq_agent::approximator::WeightsBlob;

use super::{CheckpointStore, FIRST_GENERATION, StoreError, TrainingRecord};

/// In-memory checkpoint store.
///
/// Setting `reject_writes` makes every save fail with
/// [`StoreError::Rejected`] without changing the stored values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub generation: Option<u64>,
    pub high_score: Option<u64>,
    pub weights: Option<WeightsBlob>,
    pub records: Vec<TrainingRecord>,
    pub reject_writes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes {
            Err(StoreError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl CheckpointStore for MemoryStore {
    fn load_generation(&self) -> u64 {
        self.generation.unwrap_or(FIRST_GENERATION)
    }

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.generation = Some(generation);
        Ok(())
    }

    fn load_high_score(&self) -> u64 {
        self.high_score.unwrap_or(0)
    }

    fn save_high_score(&mut self, high_score: u64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.high_score = Some(high_score);
        Ok(())
    }

    fn load_weights(&self) -> Option<WeightsBlob> {
        self.weights.clone()
    }

    fn save_weights(&mut self, weights: &WeightsBlob) -> Result<(), StoreError> {
        self.check_writable()?;
        self.weights = Some(weights.clone());
        Ok(())
    }

    fn append_record(&mut self, record: TrainingRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.records.push(record);
        Ok(())
    }

    fn load_records(&self) -> Vec<TrainingRecord> {
        self.records.clone()
    }
}
