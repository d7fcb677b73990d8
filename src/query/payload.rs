//! Classifier payloads: one per planned segment.

use super::error::QueryError;
use super::segment::{plan_segments, SegmentCategory, SegmentPlan};
use super::window::{extract_event_window, EventRecord, WindowOptions};
use crate::core::SceneLog;
use serde::{Deserialize, Serialize};

/// Everything the usage classifier needs to judge one object over one
/// segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub object_name: String,
    pub time_start: f64,
    pub time_end: f64,
    pub event_history: Vec<EventRecord>,
    pub segment_category: SegmentCategory,
}

impl PromptPayload {
    /// Resume key identifying this query across runs.
    pub fn key(&self) -> SegmentKey {
        SegmentKey::new(&self.object_name, self.time_start, self.time_end)
    }
}

/// Identity of a labelled segment.
///
/// Times are compared by bit pattern so the key is hashable; payloads and
/// labels derived from the same plan always carry identical times.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub object_name: String,
    time_start: u64,
    time_end: u64,
}

impl SegmentKey {
    pub fn new(object_name: &str, time_start: f64, time_end: f64) -> Self {
        Self {
            object_name: object_name.to_string(),
            time_start: time_start.to_bits(),
            time_end: time_end.to_bits(),
        }
    }

    pub fn time_start(&self) -> f64 {
        f64::from_bits(self.time_start)
    }

    pub fn time_end(&self) -> f64 {
        f64::from_bits(self.time_end)
    }
}

/// Options for building payloads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayloadOptions {
    pub max_segment_length: f64,
    pub window: WindowOptions,
    /// End of the video timeline; defaults to the last snapshot time.
    pub video_end: Option<f64>,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            max_segment_length: 120.0,
            window: WindowOptions::default(),
            video_end: None,
        }
    }
}

/// Build the payload for a single planned segment.
pub fn payload_for(log: &SceneLog, plan: &SegmentPlan, window: WindowOptions) -> PromptPayload {
    let events = extract_event_window(log, &plan.object_name, plan.span.start, plan.span.end, window);
    PromptPayload {
        object_name: events.object_name,
        time_start: events.time_start,
        time_end: events.time_end,
        event_history: events.event_history,
        segment_category: plan.category,
    }
}

/// Build payloads for every segment of every object in `objects`.
pub fn build_payloads<'a, I>(
    log: &SceneLog,
    objects: I,
    options: PayloadOptions,
) -> Result<Vec<PromptPayload>, QueryError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut payloads = Vec::new();
    for object in objects {
        for plan in plan_segments(log, object, options.max_segment_length, options.video_end)? {
            payloads.push(payload_for(log, &plan, options.window));
        }
    }
    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, LocationRef, Node, SceneEntry, SceneGraph};

    fn log() -> SceneLog {
        let counter = Node::Fixture("P01_counter".to_string());
        let start = SceneGraph::new().with_object(counter.clone(), "kettle");
        let picked = start.moved("kettle", &counter, &Node::Human).unwrap();
        let dropped = picked.moved("kettle", &Node::Human, &counter).unwrap();

        SceneLog::new(SceneEntry::initial(99.999, start))
            .record(SceneEntry::transition(
                100.0,
                Action::Pick,
                "kettle",
                LocationRef::Mask("m1".to_string()),
                counter.clone(),
                picked,
            ))
            .record(SceneEntry::transition(
                130.0,
                Action::Drop,
                "kettle",
                LocationRef::Unknown,
                counter,
                dropped,
            ))
    }

    #[test]
    fn payloads_cover_timeline_with_alternating_categories() {
        let payloads = build_payloads(&log(), ["kettle"], PayloadOptions::default()).unwrap();

        let summary: Vec<(f64, f64, SegmentCategory, usize)> = payloads
            .iter()
            .map(|p| {
                (
                    p.time_start,
                    p.time_end,
                    p.segment_category,
                    p.event_history.len(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                (0.0, 100.0, SegmentCategory::Passive, 1),
                (100.0, 130.0, SegmentCategory::Active, 2),
                (130.0, 130.0, SegmentCategory::Passive, 1),
            ]
        );
    }

    #[test]
    fn object_without_events_gets_one_passive_segment() {
        let payloads = build_payloads(&log(), ["mug"], PayloadOptions::default()).unwrap();

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].segment_category, SegmentCategory::Passive);
        assert_eq!(payloads[0].time_end, 130.0);
        assert!(payloads[0].event_history.is_empty());
    }

    #[test]
    fn explicit_video_end_extends_last_interval() {
        let options = PayloadOptions {
            max_segment_length: 120.0,
            video_end: Some(400.0),
            ..PayloadOptions::default()
        };
        let payloads = build_payloads(&log(), ["kettle"], options).unwrap();
        let tail: Vec<(f64, f64)> = payloads[2..]
            .iter()
            .map(|p| (p.time_start, p.time_end))
            .collect();

        assert_eq!(tail, vec![(130.0, 250.0), (250.0, 400.0)]);
    }

    #[test]
    fn segment_key_matches_payload_times() {
        let payloads = build_payloads(&log(), ["kettle"], PayloadOptions::default()).unwrap();
        let key = payloads[1].key();

        assert_eq!(key, SegmentKey::new("kettle", 100.0, 130.0));
        assert_eq!(key.time_start(), 100.0);
        assert_eq!(key.time_end(), 130.0);
    }
}
