//! Scene graph state machine and replay.
//!
//! This is the imperative shell around the pure graph operations in
//! [`crate::core`]: it owns the location side table, resolves locations,
//! logs recovered problems and appends snapshots.
//!
//! Replay is strictly sequential for one video. Independent videos share no
//! state and can be replayed in parallel.

mod builder;
mod error;
mod replay;
mod report;

pub use builder::ReplayBuilder;
pub use error::{BuildError, InvariantViolation};
pub use replay::{replay, Replay, SceneGraphMachine, StepResult, DEFAULT_INITIAL_EPSILON};
pub use report::{ReplayReport, ReportSummary};
