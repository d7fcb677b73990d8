//! Tracking inputs and the event history built from them.
//!
//! Data flows leaves first:
//! - `input`: persisted associations, tracks and the mask table
//! - `touch`: validated `(pick, drop)` pairs per object
//! - `filter`: which object names are excluded
//! - `events`: the merged, time-ordered PICK/DROP history

mod error;
mod events;
mod filter;
mod input;
mod touch;

pub use error::TrackError;
pub use events::{
    build_event_history, event_order, object_events, EventHistory, RejectedObject, Rejection,
    TrackedObject,
};
pub use filter::{ObjectFilter, SkipRule};
pub use input::{
    Association, AssociationMap, LocationResolver, MaskInfo, MaskTable, MaskTables, Track,
    VideoAssociations,
};
pub use touch::{extract_touches, Touch};
