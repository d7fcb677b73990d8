//! Retry budget for classifier attempts.
//!
//! Budget checks use `Validation` so that every exceeded limit is reported
//! together rather than only the first one hit.

use chrono::{DateTime, Utc};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Default number of attempts per query.
pub const DEFAULT_NUM_TRIES: usize = 3;

/// A limit the next attempt would break.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BudgetViolation {
    #[error("Maximum attempts ({max}) exceeded (next: {next})")]
    MaxAttemptsExceeded { max: usize, next: usize },

    #[error("Timeout ({timeout:?}) exceeded (elapsed: {elapsed:?})")]
    TimeoutExceeded {
        timeout: Duration,
        elapsed: Duration,
    },
}

/// State of one query's retry loop, checked before each attempt.
#[derive(Clone, Debug)]
pub struct AttemptContext {
    /// 1-based number of the attempt about to run.
    pub attempt: usize,
    pub started_at: DateTime<Utc>,
}

impl AttemptContext {
    pub fn first() -> Self {
        Self {
            attempt: 1,
            started_at: Utc::now(),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            started_at: self.started_at,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Bounds on how long a single query may keep retrying.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryBudget {
    max_attempts: usize,
    timeout: Option<Duration>,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_TRIES)
    }
}

impl RetryBudget {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            timeout: None,
        }
    }

    /// Stop retrying once `timeout` has elapsed since the first attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Check whether the attempt described by `context` may run.
    pub fn enforce(&self, context: &AttemptContext) -> Validation<(), NonEmptyVec<BudgetViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BudgetViolation>>> = Vec::new();

        checks.push(if context.attempt > self.max_attempts {
            Validation::fail(BudgetViolation::MaxAttemptsExceeded {
                max: self.max_attempts,
                next: context.attempt,
            })
        } else {
            Validation::success(())
        });

        if let Some(timeout) = self.timeout {
            let elapsed = context.elapsed();
            checks.push(if elapsed > timeout {
                Validation::fail(BudgetViolation::TimeoutExceeded { timeout, elapsed })
            } else {
                Validation::success(())
            });
        }

        Validation::all_vec(checks).map(|_| ())
    }
}
