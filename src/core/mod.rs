//! Core scene graph types.
//!
//! This module contains the pure data model of the reconstruction:
//! - Node identity as a sum type with two reserved nodes
//! - Immutable, structurally shared scene graph snapshots
//! - Atomic events and the append-only snapshot log
//!
//! Nothing in this module performs I/O or logging.

mod event;
mod graph;
mod history;
mod node;

pub use event::{time_str, Action, Event, LocationRef, UNKNOWN_LOCATION};
pub use graph::{GraphError, SceneGraph};
pub use history::{SceneEntry, SceneLog};
pub use node::{Node, FREE_SPACE, HUMAN};
