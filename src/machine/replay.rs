//! Scene graph state machine.
//!
//! The machine is seeded with every object at its first pick location, then
//! replays events strictly in order. Each applied event appends one
//! immutable snapshot to the log. A side table of current locations makes
//! every transition O(1) in the number of nodes.

use super::error::InvariantViolation;
use super::report::ReplayReport;
use crate::core::{Action, Event, GraphError, LocationRef, Node, SceneEntry, SceneGraph, SceneLog};
use crate::tracks::{EventHistory, LocationResolver, TrackedObject};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// Default offset of the `INITIAL` anchor before the first event, in seconds.
pub const DEFAULT_INITIAL_EPSILON: f64 = 0.001;

/// Result of feeding one event to the machine.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// Event applied; carries the node the transition touched.
    Applied(Node),

    /// Event ignored because its object was poisoned by an earlier violation.
    Skipped,

    /// Event contradicts the current state; its object is now poisoned.
    Violated(InvariantViolation),
}

/// Finished reconstruction of one video.
#[derive(Clone, Debug, PartialEq)]
pub struct Replay {
    pub log: SceneLog,
    pub report: ReplayReport,
}

/// Event-driven scene graph state machine.
pub struct SceneGraphMachine<'r, R: LocationResolver + ?Sized> {
    resolver: &'r R,
    graph: SceneGraph,
    locations: HashMap<String, Node>,
    poisoned: HashSet<String>,
    log: SceneLog,
    report: ReplayReport,
}

impl<'r, R: LocationResolver + ?Sized> SceneGraphMachine<'r, R> {
    /// Seed the world with each object at its first pick location and
    /// record the `INITIAL` snapshot at `max(first_event_time - epsilon, 0)`.
    pub fn seed(
        objects: &[TrackedObject],
        first_event_time: Option<f64>,
        epsilon: f64,
        resolver: &'r R,
    ) -> Self {
        let mut report = ReplayReport::default();
        let mut graph = SceneGraph::new();
        let mut locations = HashMap::with_capacity(objects.len());

        for object in objects {
            let node = resolve_node(resolver, &object.first_pick, &mut report);
            graph.insert(node.clone(), object.name.clone());
            locations.insert(object.name.clone(), node);
        }

        let initial_time = first_event_time.map_or(0.0, |t| (t - epsilon).max(0.0));
        let log = SceneLog::new(SceneEntry::initial(initial_time, graph.clone()));

        Self {
            resolver,
            graph,
            locations,
            poisoned: HashSet::new(),
            log,
            report,
        }
    }

    /// Current scene graph.
    pub fn current_graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Node currently holding `object`.
    pub fn location_of(&self, object: &str) -> Option<&Node> {
        self.locations.get(object)
    }

    pub fn is_poisoned(&self, object: &str) -> bool {
        self.poisoned.contains(object)
    }

    pub fn log(&self) -> &SceneLog {
        &self.log
    }

    pub fn report(&self) -> &ReplayReport {
        &self.report
    }

    /// Compute the transition for `event` without changing the machine.
    ///
    /// Returns the node touched, the node the object ends on, and the new
    /// graph.
    pub fn transition(
        &self,
        event: &Event,
        target: Node,
    ) -> Result<(Node, Node, SceneGraph), InvariantViolation> {
        let object = event.object_name.as_str();
        let current = self.locations.get(object).cloned().ok_or_else(|| {
            InvariantViolation::NotResident {
                object: object.to_string(),
                time: event.time,
            }
        })?;

        let (touched, from, to) = match event.action {
            Action::Pick => (current.clone(), current, Node::Human),
            Action::Drop => {
                if current != Node::Human {
                    return Err(InvariantViolation::NotHeld {
                        object: object.to_string(),
                        time: event.time,
                        location: current,
                    });
                }
                (target.clone(), Node::Human, target)
            }
            Action::Initial => {
                return Err(InvariantViolation::Inconsistent {
                    object: object.to_string(),
                    time: event.time,
                    detail: "INITIAL is not a replayable event".to_string(),
                })
            }
        };

        let graph = self
            .graph
            .moved(object, &from, &to)
            .map_err(|err: GraphError| InvariantViolation::Inconsistent {
                object: object.to_string(),
                time: event.time,
                detail: err.to_string(),
            })?;

        Ok((touched, to, graph))
    }

    /// Apply one event, appending a snapshot when it succeeds.
    pub fn step(&mut self, event: &Event) -> StepResult {
        let object = event.object_name.as_str();

        if self.poisoned.contains(object) {
            self.report.skipped_events += 1;
            debug!(object, time = event.time, action = %event.action, "Skipping event of poisoned object");
            return StepResult::Skipped;
        }

        let target = match event.action {
            Action::Drop => {
                if matches!(event.location, LocationRef::Unknown) {
                    self.report.unknown_drops += 1;
                }
                resolve_node(self.resolver, &event.location, &mut self.report)
            }
            _ => Node::Human,
        };

        match self.transition(event, target) {
            Ok((touched, to, graph)) => {
                debug!(
                    object,
                    time = event.time,
                    action = %event.action,
                    node = %touched,
                    "Applied transition"
                );
                self.locations.insert(object.to_string(), to);
                self.graph = graph;
                let entry = SceneEntry::transition(
                    event.time,
                    event.action,
                    object,
                    event.location.clone(),
                    touched.clone(),
                    self.graph.clone(),
                );
                self.log = std::mem::take(&mut self.log).record(entry);
                self.report.applied_events += 1;
                StepResult::Applied(touched)
            }
            Err(violation) => {
                error!(%violation, "Invariant violation, skipping remaining events of object");
                self.poisoned.insert(object.to_string());
                self.report.violations.push(violation.clone());
                StepResult::Violated(violation)
            }
        }
    }

    /// Finish the replay, handing over the log and report.
    pub fn finish(self) -> Replay {
        Replay {
            log: self.log,
            report: self.report,
        }
    }
}

/// Resolve a location reference to a node, defaulting to `Free Space`.
fn resolve_node<R: LocationResolver + ?Sized>(
    resolver: &R,
    location: &LocationRef,
    report: &mut ReplayReport,
) -> Node {
    match location {
        LocationRef::Unknown => Node::FreeSpace,
        LocationRef::Mask(mask_id) => match resolver.fixture(mask_id) {
            Some(fixture) => Node::from_fixture(Some(fixture)),
            None => {
                warn!(mask_id = %mask_id, "Unresolved location, using Free Space");
                report.unresolved_refs.push(mask_id.clone());
                Node::FreeSpace
            }
        },
    }
}

/// Replay a full event history into a scene log.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::Node;
/// use scenegraph_usage::machine::replay;
/// use scenegraph_usage::tracks::{
///     build_event_history, Association, MaskTable, ObjectFilter, Track, VideoAssociations,
/// };
///
/// let mut associations = VideoAssociations::new();
/// associations.insert(
///     "a1".to_string(),
///     Association {
///         name: "kettle".to_string(),
///         tracks: vec![Track::new("t1", 10.0, 20.0).with_masks("m1", Some("m1"))],
///     },
/// );
/// let masks = MaskTable::from_fixtures([("m1", Some("P01_counter.003"))]);
///
/// let history = build_event_history(&associations, &ObjectFilter::default());
/// let replay = replay(&history, &masks, 0.001);
///
/// assert_eq!(replay.log.len(), 3); // INITIAL, PICK, DROP
/// let last = replay.log.entries().last().unwrap();
/// assert!(last.scene_graph.contains(&Node::Fixture("P01_counter.003".to_string()), "kettle"));
/// ```
pub fn replay<R: LocationResolver + ?Sized>(
    history: &EventHistory,
    resolver: &R,
    epsilon: f64,
) -> Replay {
    let first_event_time = history.events.first().map(|event| event.time);
    let mut machine = SceneGraphMachine::seed(&history.objects, first_event_time, epsilon, resolver);

    for event in &history.events {
        machine.step(event);
    }

    let mut replay = machine.finish();
    replay.report.skipped_objects = history.skipped.clone();
    replay.report.rejected = history.rejected.clone();

    info!(
        objects = history.objects.len(),
        snapshots = replay.log.len(),
        violations = replay.report.violations.len(),
        unresolved = replay.report.unresolved_refs.len(),
        "Scene graph replay finished"
    );
    replay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{
        build_event_history, Association, MaskTable, ObjectFilter, Track, VideoAssociations,
    };

    fn counter() -> Node {
        Node::Fixture("P01_counter.003".to_string())
    }

    fn masks() -> MaskTable {
        MaskTable::from_fixtures([
            ("m_counter", Some("P01_counter.003")),
            ("m_sink", Some("P01_sink.001")),
            ("m_null", None),
        ])
    }

    fn history_of(objects: Vec<(&str, Vec<Track>)>) -> EventHistory {
        let mut associations = VideoAssociations::new();
        for (idx, (name, tracks)) in objects.into_iter().enumerate() {
            associations.insert(
                format!("a{idx}"),
                Association {
                    name: name.to_string(),
                    tracks,
                },
            );
        }
        build_event_history(&associations, &ObjectFilter::default())
    }

    #[test]
    fn initial_snapshot_precedes_first_event() {
        let history = history_of(vec![(
            "kettle",
            vec![Track::new("t1", 10.0, 20.0).with_masks("m_counter", Some("m_counter"))],
        )]);
        let replay = replay(&history, &masks(), 0.5);
        let initial = replay.log.initial().unwrap();

        assert_eq!(initial.time, 9.5);
        assert!(initial.scene_graph.contains(&counter(), "kettle"));
        assert!(initial.object_name.is_none());
    }

    #[test]
    fn initial_time_is_clamped_to_zero() {
        let history = history_of(vec![(
            "kettle",
            vec![Track::new("t1", 0.0, 2.0).with_masks("m_counter", None)],
        )]);
        let replay = replay(&history, &masks(), 0.001);
        assert_eq!(replay.log.initial().unwrap().time, 0.0);
    }

    #[test]
    fn empty_history_still_has_initial_state() {
        let replay = replay(&EventHistory::default(), &masks(), 0.001);
        assert_eq!(replay.log.len(), 1);
        assert_eq!(replay.log.initial().unwrap().time, 0.0);
        assert_eq!(replay.log.initial().unwrap().scene_graph, SceneGraph::new());
    }

    #[test]
    fn pick_moves_object_to_human() {
        let history = history_of(vec![(
            "kettle",
            vec![Track::new("t1", 10.0, 20.0).with_masks("m_counter", Some("m_sink"))],
        )]);
        let replay = replay(&history, &masks(), 0.001);
        let pick = &replay.log.entries()[1];

        assert_eq!(pick.action, Action::Pick);
        assert_eq!(pick.node, Some(counter()));
        assert!(pick.scene_graph.contains(&Node::Human, "kettle"));
        assert!(!pick.scene_graph.contains(&counter(), "kettle"));

        let drop = &replay.log.entries()[2];
        let sink = Node::Fixture("P01_sink.001".to_string());
        assert_eq!(drop.node, Some(sink.clone()));
        assert!(drop.scene_graph.contains(&sink, "kettle"));
        assert!(replay.report.is_clean());
    }

    #[test]
    fn unresolved_drop_lands_in_free_space() {
        let history = history_of(vec![(
            "mug",
            vec![Track::new("t1", 5.0, 8.0).with_masks("m_counter", Some("m_missing"))],
        )]);
        let replay = replay(&history, &masks(), 0.001);
        let drop = replay.log.entries().last().unwrap();

        assert!(drop.scene_graph.contains(&Node::FreeSpace, "mug"));
        assert_eq!(replay.report.unresolved_refs, vec!["m_missing".to_string()]);
    }

    #[test]
    fn null_fixture_seeds_free_space() {
        let history = history_of(vec![(
            "mug",
            vec![Track::new("t1", 5.0, 8.0).with_masks("m_null", None)],
        )]);
        let replay = replay(&history, &masks(), 0.001);

        let initial = replay.log.initial().unwrap();
        assert!(initial.scene_graph.contains(&Node::FreeSpace, "mug"));
        assert_eq!(replay.report.unknown_drops, 1);
    }

    #[test]
    fn missing_pick_mask_is_not_counted_as_unknown_drop() {
        let history = history_of(vec![(
            "mug",
            vec![
                Track::new("t1", 5.0, 8.0),
                Track::new("t2", 10.0, 12.0).with_masks("m_counter", Some("m_sink")),
            ],
        )]);
        let replay = replay(&history, &masks(), 0.001);

        let initial = replay.log.initial().unwrap();
        assert!(initial.scene_graph.contains(&Node::FreeSpace, "mug"));
        assert_eq!(replay.report.unknown_drops, 1);
    }

    #[test]
    fn overlapping_tracks_poison_only_that_object() {
        let history = history_of(vec![
            (
                "spoon",
                vec![
                    Track::new("t1", 1.0, 10.0).with_masks("m_counter", Some("m_counter")),
                    Track::new("t2", 4.0, 6.0).with_masks("m_counter", Some("m_sink")),
                    Track::new("t3", 20.0, 25.0).with_masks("m_counter", Some("m_sink")),
                ],
            ),
            (
                "bowl",
                vec![Track::new("t4", 2.0, 30.0).with_masks("m_sink", Some("m_counter"))],
            ),
        ]);
        let replay = replay(&history, &masks(), 0.001);

        // spoon: PICK 1, PICK 4 (held, no-op), DROP 6, DROP 10 violates.
        assert_eq!(replay.report.violations.len(), 1);
        assert_eq!(replay.report.violations[0].object(), "spoon");
        assert_eq!(replay.report.skipped_events, 2);

        let last = replay.log.entries().last().unwrap();
        assert_eq!(last.object_name.as_deref(), Some("bowl"));
        assert!(last.scene_graph.contains(&counter(), "bowl"));
    }

    #[test]
    fn step_reports_violation_for_unseeded_object() {
        let masks = masks();
        let mut machine = SceneGraphMachine::seed(&[], Some(1.0), 0.001, &masks);
        let event = Event {
            time: 1.0,
            action: Action::Pick,
            object_name: "ghost".to_string(),
            location: LocationRef::Unknown,
            ordinal: 0,
        };

        let result = machine.step(&event);
        assert!(matches!(
            result,
            StepResult::Violated(InvariantViolation::NotResident { .. })
        ));
        assert!(machine.is_poisoned("ghost"));
        assert_eq!(machine.step(&event), StepResult::Skipped);
        assert_eq!(machine.log().len(), 1);
    }

    #[test]
    fn prior_snapshots_are_unchanged() {
        let history = history_of(vec![(
            "kettle",
            vec![
                Track::new("t1", 10.0, 20.0).with_masks("m_counter", Some("m_counter")),
                Track::new("t2", 50.0, 60.0).with_masks("m_counter", Some("m_sink")),
            ],
        )]);
        let replay = replay(&history, &masks(), 0.001);
        let entries = replay.log.entries();

        assert!(entries[0].scene_graph.contains(&counter(), "kettle"));
        assert!(entries[1].scene_graph.contains(&Node::Human, "kettle"));
        assert!(entries[2].scene_graph.contains(&counter(), "kettle"));
        assert!(entries[4]
            .scene_graph
            .contains(&Node::Fixture("P01_sink.001".to_string()), "kettle"));
    }
}
