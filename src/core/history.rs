//! Append-only log of scene graph snapshots.
//!
//! The log is the canonical answer to "where was everything at time T".
//! Entries are ordered by time, start with a single `INITIAL` anchor, and
//! are never rewritten once recorded.

use super::event::{Action, LocationRef};
use super::graph::SceneGraph;
use super::node::Node;
use crate::annotations::{ActivityInfo, Annotations, Narration};
use serde::{Deserialize, Serialize};

/// Snapshot of the scene graph valid immediately after one event.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::{Action, SceneEntry, SceneGraph};
///
/// let entry = SceneEntry::initial(0.0, SceneGraph::new());
/// assert_eq!(entry.action, Action::Initial);
/// assert!(entry.object_name.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub time: f64,
    pub action: Action,
    pub object_name: Option<String>,
    pub mask_id: Option<LocationRef>,
    /// Node the transition touched: the node an object was taken from on a
    /// PICK, the node it was placed on for a DROP.
    #[serde(default)]
    pub node: Option<Node>,
    #[serde(default)]
    pub high_level_activity: ActivityInfo,
    #[serde(default)]
    pub narrations: Vec<Narration>,
    pub scene_graph: SceneGraph,
}

impl SceneEntry {
    pub fn initial(time: f64, scene_graph: SceneGraph) -> Self {
        Self {
            time,
            action: Action::Initial,
            object_name: None,
            mask_id: None,
            node: None,
            high_level_activity: ActivityInfo::default(),
            narrations: Vec::new(),
            scene_graph,
        }
    }

    pub fn transition(
        time: f64,
        action: Action,
        object_name: impl Into<String>,
        mask_id: LocationRef,
        node: Node,
        scene_graph: SceneGraph,
    ) -> Self {
        Self {
            time,
            action,
            object_name: Some(object_name.into()),
            mask_id: Some(mask_id),
            node: Some(node),
            high_level_activity: ActivityInfo::default(),
            narrations: Vec::new(),
            scene_graph,
        }
    }

    pub fn is_initial(&self) -> bool {
        self.action == Action::Initial
    }

    pub fn concerns(&self, object: &str) -> bool {
        self.object_name.as_deref() == Some(object)
    }
}

/// Ordered sequence of snapshots for one video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneLog {
    entries: Vec<SceneEntry>,
}

impl SceneLog {
    /// Create a log anchored by its `INITIAL` entry.
    pub fn new(initial: SceneEntry) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    /// Rebuild a log from entries read back from storage.
    pub fn from_entries(entries: Vec<SceneEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry, returning the extended log.
    pub fn record(mut self, entry: SceneEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn initial(&self) -> Option<&SceneEntry> {
        self.entries.first().filter(|entry| entry.is_initial())
    }

    /// Entries produced by real events, excluding the `INITIAL` anchor.
    pub fn events(&self) -> impl Iterator<Item = &SceneEntry> {
        self.entries.iter().filter(|entry| !entry.is_initial())
    }

    /// Time of the last snapshot, used as the end of the video timeline.
    pub fn last_time(&self) -> Option<f64> {
        self.entries.last().map(|entry| entry.time)
    }

    /// Entries whose time lies in the closed window `[start, end]`.
    pub fn window(&self, start: f64, end: f64) -> impl Iterator<Item = &SceneEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.time >= start && entry.time <= end)
    }

    /// Scene graph in effect at `time`: the latest snapshot at or before it,
    /// or the initial state for earlier times.
    pub fn graph_at(&self, time: f64) -> Option<&SceneGraph> {
        let idx = self.entries.partition_point(|entry| entry.time <= time);
        self.entries
            .get(idx.saturating_sub(1))
            .map(|entry| &entry.scene_graph)
    }

    /// Event times for `object`, in log order.
    pub fn event_times(&self, object: &str) -> Vec<f64> {
        self.events()
            .filter(|entry| entry.concerns(object))
            .map(|entry| entry.time)
            .collect()
    }

    /// Every object seeded into the `INITIAL` snapshot, sorted by name.
    pub fn tracked_objects(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .initial()
            .map(|entry| {
                entry
                    .scene_graph
                    .iter()
                    .flat_map(|(_, objects)| objects.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Attach activity and narration context to every entry.
    pub fn annotate(mut self, annotations: &Annotations) -> Self {
        let video_end = self.last_time();
        for entry in &mut self.entries {
            entry.high_level_activity = annotations.activity_at(entry.time, video_end);
            entry.narrations = annotations.narrations_at(entry.time);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Node {
        Node::Fixture("P01_counter".to_string())
    }

    fn sample_log() -> SceneLog {
        let start = SceneGraph::new().with_object(counter(), "kettle");
        let held = start.moved("kettle", &counter(), &Node::Human).unwrap();
        let back = held.moved("kettle", &Node::Human, &counter()).unwrap();

        SceneLog::new(SceneEntry::initial(9.999, start))
            .record(SceneEntry::transition(
                10.0,
                Action::Pick,
                "kettle",
                LocationRef::Mask("m1".to_string()),
                counter(),
                held,
            ))
            .record(SceneEntry::transition(
                20.0,
                Action::Drop,
                "kettle",
                LocationRef::Mask("m2".to_string()),
                counter(),
                back,
            ))
    }

    #[test]
    fn new_log_holds_initial_anchor() {
        let log = SceneLog::new(SceneEntry::initial(0.0, SceneGraph::new()));
        assert_eq!(log.len(), 1);
        assert!(log.initial().is_some());
        assert_eq!(log.events().count(), 0);
    }

    #[test]
    fn events_exclude_initial() {
        let log = sample_log();
        let actions: Vec<Action> = log.events().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Pick, Action::Drop]);
    }

    #[test]
    fn window_is_inclusive() {
        let log = sample_log();
        assert_eq!(log.window(10.0, 20.0).count(), 2);
        assert_eq!(log.window(10.5, 19.5).count(), 0);
    }

    #[test]
    fn graph_at_returns_latest_state() {
        let log = sample_log();
        assert!(log.graph_at(0.0).unwrap().contains(&counter(), "kettle"));
        assert!(log.graph_at(15.0).unwrap().contains(&Node::Human, "kettle"));
        assert!(log.graph_at(20.0).unwrap().contains(&counter(), "kettle"));
    }

    #[test]
    fn event_times_filter_by_object() {
        let log = sample_log();
        assert_eq!(log.event_times("kettle"), vec![10.0, 20.0]);
        assert!(log.event_times("mug").is_empty());
        assert_eq!(log.last_time(), Some(20.0));
    }

    #[test]
    fn tracked_objects_come_from_initial_snapshot() {
        let start = SceneGraph::new()
            .with_object(counter(), "mug")
            .with_object(Node::FreeSpace, "kettle");
        let log = SceneLog::new(SceneEntry::initial(0.0, start));

        assert_eq!(log.tracked_objects(), vec!["kettle".to_string(), "mug".to_string()]);
        assert!(SceneLog::default().tracked_objects().is_empty());
    }

    #[test]
    fn annotate_fills_every_entry() {
        let annotations = Annotations::new(
            vec![],
            vec![Narration {
                narration: "lift kettle".to_string(),
                start_timestamp: 9.0,
                end_timestamp: 11.0,
            }],
        );
        let log = sample_log().annotate(&annotations);

        assert_eq!(log.entries()[1].narrations.len(), 1);
        assert!(log.entries()[2].narrations.is_empty());
    }

    #[test]
    fn log_serializes_correctly() {
        let log = sample_log();
        let json = serde_json::to_string(&log).unwrap();
        let back: SceneLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
