//! Event-window queries over a scene log.

use super::recover::{recover_before, ActionContext};
use crate::core::{time_str, Action, Node, SceneEntry, SceneGraph, SceneLog};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which events a window query reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    /// Only the queried object's own events.
    #[default]
    QueriedObject,
    /// Every object's events inside the window.
    AllObjects,
}

/// Options shaping a window query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowOptions {
    pub scope: EventScope,
    /// Attach the full pre-action scene graph to each record.
    pub include_full_scene_graph: bool,
}

/// One action inside a query window, described from the camera wearer's
/// point of view just before acting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time: f64,
    pub time_str: String,
    pub action: Action,
    pub object: String,
    /// Display name of the touched node, scope prefix removed.
    pub fixture: String,
    pub objects_in_hand: Vec<String>,
    pub nearby_objects_fixture: Vec<String>,
    pub action_narrations: Vec<String>,
    pub high_level_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_scene_graph: Option<SceneGraph>,
}

impl EventRecord {
    /// Describe one logged transition. Returns `None` for `INITIAL`.
    pub fn from_entry(entry: &SceneEntry, include_full_scene_graph: bool) -> Option<Self> {
        if entry.is_initial() {
            return None;
        }
        let object = entry.object_name.clone()?;
        let node = entry.node.clone().unwrap_or(Node::FreeSpace);

        let before = match recover_before(&entry.scene_graph, entry.action, &object, &node) {
            Ok(graph) => graph,
            Err(error) => {
                warn!(
                    object = %object,
                    time = entry.time,
                    %error,
                    "Snapshot does not match its action, describing post-action state"
                );
                entry.scene_graph.clone()
            }
        };
        let context = ActionContext::from_before(&before, &object, &node);

        Some(Self {
            time: entry.time,
            time_str: time_str(entry.time),
            action: entry.action,
            fixture: node.display_name().to_string(),
            objects_in_hand: context.objects_in_hand.into_iter().collect(),
            nearby_objects_fixture: context.nearby_objects.into_iter().collect(),
            action_narrations: entry
                .narrations
                .iter()
                .map(|n| n.narration.clone())
                .collect(),
            high_level_activity: entry.high_level_activity.high_level_activity_label.clone(),
            full_scene_graph: include_full_scene_graph.then_some(before),
            object,
        })
    }
}

/// Events of interest for one object over `[time_start, time_end]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventWindow {
    pub object_name: String,
    pub time_start: f64,
    pub time_end: f64,
    pub event_history: Vec<EventRecord>,
}

impl EventWindow {
    pub fn is_empty(&self) -> bool {
        self.event_history.is_empty()
    }
}

/// Extract the event history of `object_name` over the closed window
/// `[time_start, time_end]`, skipping the `INITIAL` anchor.
///
/// A window with no matching events yields an empty history, not an error.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::{SceneEntry, SceneGraph, SceneLog};
/// use scenegraph_usage::query::{extract_event_window, WindowOptions};
///
/// let log = SceneLog::new(SceneEntry::initial(0.0, SceneGraph::new()));
/// let window = extract_event_window(&log, "kettle", 0.0, 60.0, WindowOptions::default());
/// assert!(window.is_empty());
/// ```
pub fn extract_event_window(
    log: &SceneLog,
    object_name: &str,
    time_start: f64,
    time_end: f64,
    options: WindowOptions,
) -> EventWindow {
    let event_history = log
        .window(time_start, time_end)
        .filter(|entry| match options.scope {
            EventScope::QueriedObject => entry.concerns(object_name),
            EventScope::AllObjects => true,
        })
        .filter_map(|entry| EventRecord::from_entry(entry, options.include_full_scene_graph))
        .collect();

    EventWindow {
        object_name: object_name.to_string(),
        time_start,
        time_end,
        event_history,
    }
}
