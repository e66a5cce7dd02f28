use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::app_dirs::AppDirs;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not access score file: {0}")]
    Io(#[from] std::io::Error),

    #[error("score file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Best result for one (n, grid size) level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Percentage, 0-100
    pub accuracy: f64,
    pub score: u32,
    pub total: u32,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
}

pub type ScoreTable = BTreeMap<String, ScoreRecord>;

pub fn score_key(n: usize, grid_size: usize) -> String {
    format!("DN{n}_G{grid_size}")
}

/// `DN2_G8` rendered as `N-2 Grid:8`.
pub fn level_label(key: &str) -> String {
    key.replace("DN", "N-").replace("_G", " Grid:")
}

/// The `limit` best records by accuracy, best first.
pub fn top_records(table: &ScoreTable, limit: usize) -> Vec<(&String, &ScoreRecord)> {
    table
        .iter()
        .sorted_by(|a, b| {
            b.1.accuracy
                .partial_cmp(&a.1.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .take(limit)
        .collect()
}

/// True when `accuracy` should replace whatever is stored under `key`.
pub fn is_new_record(table: &ScoreTable, key: &str, accuracy: f64) -> bool {
    table
        .get(key)
        .map_or(true, |existing| accuracy > existing.accuracy)
}

pub trait ScoreStore {
    fn load(&self) -> Result<ScoreTable, StoreError>;
    fn save(&mut self, key: &str, record: &ScoreRecord) -> Result<(), StoreError>;
}

/// JSON file store, compatible with `~/.nback_scores.json`.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::scores_path().unwrap_or_else(|| PathBuf::from("nback_scores.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> Result<ScoreTable, StoreError> {
        if !self.path.exists() {
            return Ok(ScoreTable::new());
        }
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&mut self, key: &str, record: &ScoreRecord) -> Result<(), StoreError> {
        let mut table = self.load().unwrap_or_default();
        table.insert(key.to_string(), record.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&table)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Score table snapshot plus the store it came from.
pub struct HighScores {
    store: Box<dyn ScoreStore>,
    table: ScoreTable,
}

impl HighScores {
    /// Loads the table. A failed load yields an empty table and the error,
    /// which callers surface as a warning.
    pub fn open(store: Box<dyn ScoreStore>) -> (Self, Option<StoreError>) {
        match store.load() {
            Ok(table) => (Self { store, table }, None),
            Err(err) => {
                warn!(error = %err, "could not load high scores, starting empty");
                (
                    Self {
                        store,
                        table: ScoreTable::new(),
                    },
                    Some(err),
                )
            }
        }
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn is_new_record(&self, key: &str, accuracy: f64) -> bool {
        is_new_record(&self.table, key, accuracy)
    }

    /// Persists `record` and updates the snapshot on success.
    pub fn save(&mut self, key: &str, record: ScoreRecord) -> Result<(), StoreError> {
        self.store.save(key, &record)?;
        info!(key, accuracy = record.accuracy, "new high score saved");
        self.table.insert(key.to_string(), record);
        Ok(())
    }
}
