//! Crate-level error type.

use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;
use crate::io::IoError;
use crate::machine::BuildError;
use crate::query::QueryError;
use thiserror::Error;

/// Any error a pipeline stage can return.
///
/// Problems with individual objects or classifier queries are not errors;
/// they are recorded in a `ReplayReport` or an unresolved label.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;
