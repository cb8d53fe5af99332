//! Score store
//!
//! Append-only list of finished sessions. The measuring core only appends;
//! listing, totals, and clearing serve the leaderboard commands.
//!
//! Records are persisted as a pretty-printed JSON array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Label recorded for sessions of the measuring activity
pub const MEASUREMENT_LABEL: &str = "measurement";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Score file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u32,

    /// What was played (a word for spelling rounds, "measurement" here)
    #[serde(alias = "word")]
    pub label: String,

    pub date: DateTime<Utc>,

    #[serde(rename = "playerName", alias = "player_name")]
    pub player_name: String,
}

impl ScoreRecord {
    pub fn new(score: u32, label: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            score,
            label: label.into(),
            date: Utc::now(),
            player_name: player_name.into(),
        }
    }
}

/// Destination for finished-session records
pub trait ScoreStore {
    fn append(&mut self, record: ScoreRecord) -> Result<(), StoreError>;
}

/// In-memory store, handy for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    records: Vec<ScoreRecord>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }
}

impl ScoreStore for MemoryScoreStore {
    fn append(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        self.records.push(record);
        Ok(())
    }
}

/// Score list in a JSON file
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// All records in insertion order; a missing file is an empty list
    pub fn load(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        let content = serde_json::to_string_pretty(records).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(|e| self.io_err(e))
    }

    /// Records sorted by score, highest first (stable for ties)
    pub fn leaderboard(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records = self.load()?;
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(records)
    }

    /// Sum of all recorded scores
    pub fn total_points(&self) -> Result<u64, StoreError> {
        Ok(self.load()?.iter().map(|r| u64::from(r.score)).sum())
    }

    /// Remove every record; returns how many were removed
    pub fn clear(&self) -> Result<usize, StoreError> {
        let count = self.load()?.len();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| self.io_err(e))?;
        }
        info!(count, path = %self.path.display(), "cleared scores");
        Ok(count)
    }
}

impl ScoreStore for JsonScoreStore {
    fn append(&mut self, record: ScoreRecord) -> Result<(), StoreError> {
        let mut records = self.load()?;
        debug!(score = record.score, path = %self.path.display(), "appending score");
        records.push(record);
        self.save(&records)
    }
}
