//! Read-only queries over a replayed scene log.
//!
//! Nothing here mutates a log. Pre-action state is recovered by inverting
//! the logged transition, so queries stay linear in the window size.

pub mod error;
pub mod payload;
pub mod recover;
pub mod segment;
pub mod window;

pub use error::QueryError;
pub use payload::{build_payloads, payload_for, PayloadOptions, PromptPayload, SegmentKey};
pub use recover::{recover_before, ActionContext};
pub use segment::{
    plan_segments, split_interval, timeline_boundaries, SegmentCategory, SegmentPlan, TimeSpan,
};
pub use window::{extract_event_window, EventRecord, EventScope, EventWindow, WindowOptions};
