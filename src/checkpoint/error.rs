//! Checkpoint error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to encode scene checkpoint as {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("Failed to decode scene checkpoint from {format}: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The stored log has no `INITIAL` anchor.
    #[error("Scene log of video '{video_id}' does not start with an INITIAL entry")]
    MissingInitial { video_id: String },

    #[error("Event entry at {time}s has no object name")]
    UnnamedEvent { time: f64 },

    /// Entry `index` is earlier than the one before it.
    #[error("Scene log entry {index} at {time}s precedes the previous entry at {previous}s")]
    OutOfOrder { index: usize, time: f64, previous: f64 },

    #[error("Checkpoint file error: {0}")]
    Io(#[from] std::io::Error),
}
