//! The classifier oracle seam.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure to obtain any response from the oracle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle rate limited")]
    RateLimited,

    #[error("Oracle request failed: {0}")]
    Request(String),
}

/// Something that answers usage questions: a language model client, a
/// human labelling tool, or a test double.
///
/// Implementations may be slow, unavailable or non-deterministic; callers
/// retry under a [`RetryBudget`](super::RetryBudget).
pub trait UsageOracle: Send + Sync {
    /// Return the raw response text for one system/user prompt pair.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError>;
}

/// Environment classifier effects run against.
#[derive(Clone)]
pub struct OracleEnv {
    oracle: Arc<dyn UsageOracle>,
}

impl OracleEnv {
    pub fn new<O: UsageOracle + 'static>(oracle: O) -> Self {
        Self {
            oracle: Arc::new(oracle),
        }
    }

    pub fn from_arc(oracle: Arc<dyn UsageOracle>) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &dyn UsageOracle {
        self.oracle.as_ref()
    }
}

impl fmt::Debug for OracleEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleEnv").finish_non_exhaustive()
    }
}
