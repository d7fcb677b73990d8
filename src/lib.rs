//! Scenegraph Usage: scene graph reconstruction for egocentric video.
//!
//! Pick/drop tracks of objects are replayed through a small state machine
//! that maintains where every object is: in the camera wearer's hand
//! (`Human`), at a fixture, or in `Free Space` when no fixture is known.
//! Every event yields an immutable snapshot. The snapshot log then answers
//! windowed questions about a single object, which feed a usage classifier.
//!
//! The crate follows a "pure core, imperative shell" layout:
//!
//! - **core**: node identity, copy-on-write scene graphs, the snapshot log
//! - **tracks**: tracking inputs, touch extraction and the event history
//! - **machine**: replay of the event history into a snapshot log
//! - **query**: pre-action recovery, event windows and segment planning
//! - **prompt** / **classifier**: the usage classifier boundary
//! - **checkpoint** / **io** / **config**: persistence and settings
//!
//! # Example
//!
//! ```rust
//! use scenegraph_usage::core::Node;
//! use scenegraph_usage::machine::ReplayBuilder;
//! use scenegraph_usage::query::{extract_event_window, WindowOptions};
//! use scenegraph_usage::tracks::{Association, MaskTable, Track, VideoAssociations};
//!
//! let mut associations = VideoAssociations::new();
//! associations.insert(
//!     "a1".to_string(),
//!     Association {
//!         name: "kettle".to_string(),
//!         tracks: vec![Track::new("t1", 10.0, 20.0).with_masks("m1", Some("m2"))],
//!     },
//! );
//! let masks = MaskTable::from_fixtures([
//!     ("m1", Some("P01_counter.003")),
//!     ("m2", Some("P01_hob.001")),
//! ]);
//!
//! let replay = ReplayBuilder::new()
//!     .associations(&associations)
//!     .resolver(&masks)
//!     .build()
//!     .unwrap();
//!
//! let last = replay.log.entries().last().unwrap();
//! assert!(last.scene_graph.contains(&Node::Fixture("P01_hob.001".to_string()), "kettle"));
//!
//! let window = extract_event_window(&replay.log, "kettle", 0.0, 30.0, WindowOptions::default());
//! assert_eq!(window.event_history.len(), 2);
//! assert_eq!(window.event_history[0].fixture, "counter.003");
//! ```

pub mod annotations;
pub mod checkpoint;
pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod machine;
pub mod pipeline;
pub mod prompt;
pub mod query;
pub mod tracks;

// Re-export commonly used types
pub use crate::core::{Action, Node, SceneEntry, SceneGraph, SceneLog};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use machine::{Replay, ReplayBuilder, ReplayReport};
