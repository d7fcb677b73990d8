//! Replay errors.

use crate::core::Node;
use thiserror::Error;

/// Event that contradicts the replayed state, indicating corrupt tracks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("PICK of '{object}' at {time}s but the object is not resident anywhere")]
    NotResident { object: String, time: f64 },

    #[error("DROP of '{object}' at {time}s but the object is at '{location}', not held")]
    NotHeld {
        object: String,
        time: f64,
        location: Node,
    },

    #[error("Transition of '{object}' at {time}s left the graph inconsistent: {detail}")]
    Inconsistent {
        object: String,
        time: f64,
        detail: String,
    },
}

impl InvariantViolation {
    pub fn object(&self) -> &str {
        match self {
            Self::NotResident { object, .. }
            | Self::NotHeld { object, .. }
            | Self::Inconsistent { object, .. } => object,
        }
    }
}

/// Errors that can occur when configuring a replay.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Associations not specified. Call .associations(map) before .build()")]
    MissingAssociations,

    #[error("Location resolver not specified. Call .resolver(table) before .build()")]
    MissingResolver,

    #[error("Initial epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),
}
