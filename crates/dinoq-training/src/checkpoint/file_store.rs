use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use dinoq_agent::approximator::WeightsBlob;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{CheckpointStore, FIRST_GENERATION, StoreError, TrainingRecord};

pub const GENERATION_FILE: &str = "generation.json";
pub const HIGH_SCORE_FILE: &str = "highscore.json";
pub const WEIGHTS_FILE: &str = "model-weights.json";
pub const RECORDS_FILE: &str = "training-records.json";

/// Contents of the generation and high score files.
///
/// Written as a bare integer. An object holding the value under its name is
/// also accepted on read.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CounterFile {
    Bare(u64),
    Generation {
        generation: u64,
    },
    HighScore {
        #[serde(rename = "highScore")]
        high_score: u64,
    },
}

impl CounterFile {
    fn value(self) -> u64 {
        match self {
            Self::Bare(n)
            | Self::Generation { generation: n }
            | Self::HighScore { high_score: n } => n,
        }
    }
}

/// Checkpoint store backed by one JSON file per artifact in a directory.
///
/// The directory is created on the first save. Every save writes a temporary
/// file next to the target and renames it over the target, so readers see
/// either the old or the new value.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    records: Vec<TrainingRecord>,
}

impl JsonFileStore {
    /// Opens the store, reading the existing training log if there is one.
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        let dir = dir.into();
        let records = read_json(&dir.join(RECORDS_FILE)).unwrap_or_default();
        Self { dir, records }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl CheckpointStore for JsonFileStore {
    fn load_generation(&self) -> u64 {
        read_json(&self.path(GENERATION_FILE)).map_or(FIRST_GENERATION, CounterFile::value)
    }

    fn save_generation(&mut self, generation: u64) -> Result<(), StoreError> {
        write_json_atomic(&self.path(GENERATION_FILE), &generation)
    }

    fn load_high_score(&self) -> u64 {
        read_json(&self.path(HIGH_SCORE_FILE)).map_or(0, CounterFile::value)
    }

    fn save_high_score(&mut self, high_score: u64) -> Result<(), StoreError> {
        write_json_atomic(&self.path(HIGH_SCORE_FILE), &high_score)
    }

    fn load_weights(&self) -> Option<WeightsBlob> {
        read_json(&self.path(WEIGHTS_FILE))
    }

    fn save_weights(&mut self, weights: &WeightsBlob) -> Result<(), StoreError> {
        write_json_atomic(&self.path(WEIGHTS_FILE), weights)
    }

    fn append_record(&mut self, record: TrainingRecord) -> Result<(), StoreError> {
        self.records.push(record);
        write_json_atomic(&self.path(RECORDS_FILE), &self.records)
    }

    fn load_records(&self) -> Vec<TrainingRecord> {
        self.records.clone()
    }
}

/// Reads a JSON file. A missing file is silently `None`; an unreadable or
/// malformed one is logged and also `None`.
fn read_json<T>(path: &Path) -> Option<T>
where
    T: DeserializeOwned,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no persisted file, using default");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read file, using default");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "malformed file, using default");
            None
        }
    }
}

fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let io_error = |source: io::Error| StoreError::Io {
        path: path.to_owned(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_error)?;

    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_owned(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));
    fs::write(&tmp_path, bytes).map_err(io_error)?;
    fs::rename(&tmp_path, path).map_err(io_error)?;
    tracing::debug!(path = %path.display(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use dinoq_agent::approximator::Tensor;

    use super::*;
    use crate::checkpoint::{Checkpoint, tests::record};

    /// Fresh per-test directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dinoq-store-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn weights() -> WeightsBlob {
        WeightsBlob::new(vec![
            Tensor::new(vec![2, 2], vec![0.1, -0.2, 0.3, 4e-7]),
            Tensor::new(vec![2], vec![0.0, 1.5]),
        ])
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = scratch_dir("missing");
        let store = JsonFileStore::new(&dir);
        let checkpoint = store.load_checkpoint();
        assert_eq!(checkpoint.generation, 1);
        assert_eq!(checkpoint.high_score, 0);
        assert!(checkpoint.weights.is_none());
        assert!(store.load_records().is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_round_trip() {
        let dir = scratch_dir("round-trip");
        let mut store = JsonFileStore::new(&dir);
        store.save_generation(42).unwrap();
        store.save_high_score(1234).unwrap();
        store.save_weights(&weights()).unwrap();
        store.append_record(record(41, 1234)).unwrap();
        store.append_record(record(42, 99)).unwrap();

        let reopened = JsonFileStore::new(&dir);
        let checkpoint = reopened.load_checkpoint();
        assert_eq!(checkpoint.generation, 42);
        assert_eq!(checkpoint.high_score, 1234);
        assert_eq!(checkpoint.weights, Some(weights()));
        assert_eq!(reopened.load_records(), vec![record(41, 1234), record(42, 99)]);

        // no temporary files are left behind
        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_files_yield_defaults() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(GENERATION_FILE), "{ not json").unwrap();
        fs::write(dir.join(HIGH_SCORE_FILE), r#"{"highScore": "high"}"#).unwrap();
        fs::write(dir.join(WEIGHTS_FILE), "[1, 2, 3]").unwrap();
        fs::write(dir.join(RECORDS_FILE), "{}").unwrap();

        let mut store = JsonFileStore::new(&dir);
        assert_eq!(store.load_checkpoint(), Checkpoint::default());
        assert!(store.load_records().is_empty());

        // a save replaces the malformed value
        store.save_generation(7).unwrap();
        assert_eq!(store.load_generation(), 7);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_formats() {
        let dir = scratch_dir("formats");
        let mut store = JsonFileStore::new(&dir);
        store.save_generation(3).unwrap();
        store.save_high_score(17).unwrap();

        let generation: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join(GENERATION_FILE)).unwrap()).unwrap();
        assert_eq!(generation, serde_json::json!(3));
        let high_score: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.join(HIGH_SCORE_FILE)).unwrap()).unwrap();
        assert_eq!(high_score, serde_json::json!(17));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reads_bare_and_wrapped_counters() {
        let dir = scratch_dir("counters");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(GENERATION_FILE), "12").unwrap();
        fs::write(dir.join(HIGH_SCORE_FILE), "345").unwrap();
        let store = JsonFileStore::new(&dir);
        assert_eq!(store.load_generation(), 12);
        assert_eq!(store.load_high_score(), 345);

        fs::write(dir.join(GENERATION_FILE), r#"{"generation": 13}"#).unwrap();
        fs::write(dir.join(HIGH_SCORE_FILE), r#"{"highScore": 346}"#).unwrap();
        assert_eq!(store.load_generation(), 13);
        assert_eq!(store.load_high_score(), 346);
        fs::remove_dir_all(&dir).unwrap();
    }
}
