//! Track validation errors.

use thiserror::Error;

/// Reasons a track cannot be turned into a pick/drop touch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackError {
    #[error("Time segment of track '{track_id}' has {len} values, expected exactly 2")]
    Malformed { track_id: String, len: usize },

    #[error("Time segment of track '{track_id}' is not finite: [{pick}, {drop}]")]
    NonFinite {
        track_id: String,
        pick: f64,
        drop: f64,
    },

    #[error("Time segment of track '{track_id}' starts before the video: [{pick}, {drop}]")]
    Negative {
        track_id: String,
        pick: f64,
        drop: f64,
    },

    #[error("Track '{track_id}' drops at {drop} before it is picked at {pick}")]
    Reversed {
        track_id: String,
        pick: f64,
        drop: f64,
    },
}

impl TrackError {
    pub fn track_id(&self) -> &str {
        match self {
            Self::Malformed { track_id, .. }
            | Self::NonFinite { track_id, .. }
            | Self::Negative { track_id, .. }
            | Self::Reversed { track_id, .. } => track_id,
        }
    }
}
