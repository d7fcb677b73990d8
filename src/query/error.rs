//! Query errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Maximum segment length must be positive and finite, got {0}")]
    InvalidSegmentLength(f64),

    #[error("Invalid time interval [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },
}
