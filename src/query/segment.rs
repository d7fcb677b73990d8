//! Segment planning for usage queries.
//!
//! An object's timeline is cut at every one of its events. The resulting
//! intervals alternate between untouched (`passive`) and held (`active`)
//! stretches. Long intervals are split into bounded chunks so that every
//! classifier query covers a bounded amount of context.

use super::error::QueryError;
use crate::core::SceneLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Hint telling the classifier which few-shot examples to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentCategory {
    Passive,
    Active,
}

impl SegmentCategory {
    /// Category of the `index`-th interval of an object's timeline.
    pub fn for_interval(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Passive
        } else {
            Self::Active
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed time range `[start, end]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// One planned classifier query for an object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub object_name: String,
    pub span: TimeSpan,
    pub category: SegmentCategory,
}

/// Split `[start, end]` into chunks no longer than `max_length`.
///
/// A trailing chunk shorter than half of `max_length` is merged into the
/// chunk before it. Chunks are contiguous and cover the interval exactly.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::query::{split_interval, TimeSpan};
///
/// let chunks = split_interval(0.0, 250.0, 120.0).unwrap();
/// assert_eq!(chunks, vec![TimeSpan::new(0.0, 120.0), TimeSpan::new(120.0, 250.0)]);
/// ```
pub fn split_interval(start: f64, end: f64, max_length: f64) -> Result<Vec<TimeSpan>, QueryError> {
    if !max_length.is_finite() || max_length <= 0.0 {
        return Err(QueryError::InvalidSegmentLength(max_length));
    }
    if !start.is_finite() || !end.is_finite() || end < start {
        return Err(QueryError::InvalidInterval { start, end });
    }

    if end - start <= max_length {
        return Ok(vec![TimeSpan::new(start, end)]);
    }

    let half = max_length / 2.0;
    let mut chunks = Vec::new();
    let mut idx = 0usize;
    loop {
        let chunk_start = start + idx as f64 * max_length;
        let mut chunk_end = (start + (idx + 1) as f64 * max_length).min(end);
        if end - chunk_end < half {
            chunk_end = end;
        }
        chunks.push(TimeSpan::new(chunk_start, chunk_end));
        if chunk_end >= end {
            break;
        }
        idx += 1;
    }
    Ok(chunks)
}

/// Cut points of an object's timeline: `0`, each of its event times, and
/// the end of the video.
pub fn timeline_boundaries(log: &SceneLog, object: &str, video_end: f64) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(log.event_times(object))
        .chain(std::iter::once(video_end))
        .collect()
}

/// Plan every classifier query for `object`.
///
/// `video_end` defaults to the time of the last snapshot and is never
/// earlier than it.
pub fn plan_segments(
    log: &SceneLog,
    object: &str,
    max_length: f64,
    video_end: Option<f64>,
) -> Result<Vec<SegmentPlan>, QueryError> {
    let last = log.last_time().unwrap_or(0.0).max(0.0);
    let video_end = match video_end {
        Some(end) if end < last => {
            warn!(video_end = end, last_snapshot = last, "Video end precedes the last snapshot, extending it");
            last
        }
        Some(end) => end,
        None => last,
    };
    let boundaries = timeline_boundaries(log, object, video_end);

    let mut plans = Vec::new();
    for (idx, pair) in boundaries.windows(2).enumerate() {
        let category = SegmentCategory::for_interval(idx);
        for span in split_interval(pair[0], pair[1], max_length)? {
            plans.push(SegmentPlan {
                object_name: object.to_string(),
                span,
                category,
            });
        }
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(chunks: &[TimeSpan]) -> Vec<(f64, f64)> {
        chunks.iter().map(|c| (c.start, c.end)).collect()
    }

    #[test]
    fn short_interval_is_not_split() {
        let chunks = split_interval(10.0, 70.0, 120.0).unwrap();
        assert_eq!(spans(&chunks), vec![(10.0, 70.0)]);
    }

    #[test]
    fn long_interval_keeps_half_length_tail() {
        let chunks = split_interval(0.0, 300.0, 120.0).unwrap();
        assert_eq!(
            spans(&chunks),
            vec![(0.0, 120.0), (120.0, 240.0), (240.0, 300.0)]
        );
    }

    #[test]
    fn short_tail_merges_into_previous_chunk() {
        let chunks = split_interval(0.0, 250.0, 120.0).unwrap();
        assert_eq!(spans(&chunks), vec![(0.0, 120.0), (120.0, 250.0)]);
    }

    #[test]
    fn exact_multiple_produces_full_chunks() {
        let chunks = split_interval(30.0, 270.0, 120.0).unwrap();
        assert_eq!(spans(&chunks), vec![(30.0, 150.0), (150.0, 270.0)]);
    }

    #[test]
    fn zero_length_interval_is_one_chunk() {
        let chunks = split_interval(5.0, 5.0, 120.0).unwrap();
        assert_eq!(spans(&chunks), vec![(5.0, 5.0)]);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            split_interval(0.0, 10.0, 0.0),
            Err(QueryError::InvalidSegmentLength(_))
        ));
        assert!(matches!(
            split_interval(10.0, 0.0, 120.0),
            Err(QueryError::InvalidInterval { .. })
        ));
    }

    fn log_with_events_at(times: &[f64]) -> SceneLog {
        use crate::core::{Action, LocationRef, Node, SceneEntry, SceneGraph};

        let counter = Node::Fixture("P01_counter".to_string());
        let start = SceneGraph::new().with_object(counter.clone(), "kettle");
        let mut graph = start.clone();
        let mut log = SceneLog::new(SceneEntry::initial(0.0, start));
        for (i, &time) in times.iter().enumerate() {
            let (action, from, to) = if i % 2 == 0 {
                (Action::Pick, counter.clone(), Node::Human)
            } else {
                (Action::Drop, Node::Human, counter.clone())
            };
            graph = graph.moved("kettle", &from, &to).unwrap();
            log = log.record(SceneEntry::transition(
                time,
                action,
                "kettle",
                LocationRef::Mask("m1".to_string()),
                counter.clone(),
                graph.clone(),
            ));
        }
        log
    }

    #[test]
    fn early_video_end_is_extended_to_last_snapshot() {
        let log = log_with_events_at(&[100.0, 130.0]);
        let plans = plan_segments(&log, "kettle", 120.0, Some(50.0)).unwrap();

        let summary: Vec<(f64, f64, SegmentCategory)> =
            plans.iter().map(|p| (p.span.start, p.span.end, p.category)).collect();
        assert_eq!(
            summary,
            vec![
                (0.0, 100.0, SegmentCategory::Passive),
                (100.0, 130.0, SegmentCategory::Active),
                (130.0, 130.0, SegmentCategory::Passive),
            ]
        );
    }

    #[test]
    fn categories_alternate() {
        assert_eq!(SegmentCategory::for_interval(0), SegmentCategory::Passive);
        assert_eq!(SegmentCategory::for_interval(1), SegmentCategory::Active);
        assert_eq!(SegmentCategory::for_interval(4), SegmentCategory::Passive);
        assert_eq!(
            serde_json::to_string(&SegmentCategory::Active).unwrap(),
            "\"active\""
        );
    }
}
