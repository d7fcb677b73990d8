//! Checkpoints of built scene logs.
//!
//! A checkpoint freezes the result of one video's replay so that the
//! downstream query and classification stages can be rerun, or resumed
//! after a failure, without replaying tracks again.

use crate::core::SceneLog;
use crate::machine::ReportSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of one replayed video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneCheckpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    pub created_at: DateTime<Utc>,

    pub video_id: String,

    /// Complete snapshot sequence, `INITIAL` first
    pub log: SceneLog,

    /// Counts of what the replay recovered from
    pub summary: ReportSummary,
}

impl SceneCheckpoint {
    pub fn new(video_id: impl Into<String>, log: SceneLog, summary: ReportSummary) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            video_id: video_id.into(),
            log,
            summary,
        }
    }

    /// Check the format version and the shape of the stored log.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if self.log.initial().is_none() {
            return Err(CheckpointError::MissingInitial {
                video_id: self.video_id.clone(),
            });
        }
        if let Some(entry) = self.log.events().find(|entry| entry.object_name.is_none()) {
            return Err(CheckpointError::UnnamedEvent { time: entry.time });
        }
        let entries = self.log.entries();
        if let Some(index) = (1..entries.len()).find(|&i| entries[i].time < entries[i - 1].time) {
            return Err(CheckpointError::OutOfOrder {
                index,
                time: entries[index].time,
                previous: entries[index - 1].time,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Encode {
            format: "json",
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json).map_err(|e| CheckpointError::Decode {
            format: "json",
            message: e.to_string(),
        })?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode {
            format: "bincode",
            message: e.to_string(),
        })
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode {
            format: "bincode",
            message: e.to_string(),
        })?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Write the checkpoint to `path`, replacing any previous one only once
    /// the new file is complete. A `.bin` extension selects the binary
    /// format, anything else JSON.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let bytes = if is_binary(path) {
            self.to_binary()?
        } else {
            self.to_json()?.into_bytes()
        };
        let staging = temp_path(path);
        fs::write(&staging, bytes)?;
        fs::rename(&staging, path)?;
        info!(path = %path.display(), video_id = %self.video_id, id = %self.id, "Checkpoint saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let checkpoint = if is_binary(path) {
            Self::from_binary(&fs::read(path)?)?
        } else {
            Self::from_json(&fs::read_to_string(path)?)?
        };
        info!(path = %path.display(), video_id = %checkpoint.video_id, "Checkpoint loaded");
        Ok(checkpoint)
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "bin")
}
