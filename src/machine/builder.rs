//! Builder for configuring and running a replay.

use super::error::BuildError;
use super::replay::{replay, Replay, DEFAULT_INITIAL_EPSILON};
use crate::annotations::Annotations;
use crate::tracks::{build_event_history, LocationResolver, ObjectFilter, VideoAssociations};

/// Fluent configuration of a scene graph replay for one video.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::machine::ReplayBuilder;
/// use scenegraph_usage::tracks::{Association, MaskTable, Track, VideoAssociations};
///
/// let mut associations = VideoAssociations::new();
/// associations.insert(
///     "a1".to_string(),
///     Association {
///         name: "mug".to_string(),
///         tracks: vec![Track::new("t1", 5.0, 8.0).with_masks("m1", None)],
///     },
/// );
/// let masks = MaskTable::from_fixtures([("m1", Some("P01_counter.003"))]);
///
/// let replay = ReplayBuilder::new()
///     .associations(&associations)
///     .resolver(&masks)
///     .build()
///     .unwrap();
/// assert_eq!(replay.log.len(), 3);
/// ```
pub struct ReplayBuilder<'a, R: LocationResolver + ?Sized> {
    associations: Option<&'a VideoAssociations>,
    resolver: Option<&'a R>,
    annotations: Option<&'a Annotations>,
    filter: ObjectFilter,
    epsilon: f64,
}

impl<'a, R: LocationResolver + ?Sized> ReplayBuilder<'a, R> {
    pub fn new() -> Self {
        Self {
            associations: None,
            resolver: None,
            annotations: None,
            filter: ObjectFilter::default(),
            epsilon: DEFAULT_INITIAL_EPSILON,
        }
    }

    /// Set the video's associations (required).
    pub fn associations(mut self, associations: &'a VideoAssociations) -> Self {
        self.associations = Some(associations);
        self
    }

    /// Set the location resolver (required).
    pub fn resolver(mut self, resolver: &'a R) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Attach activity and narration context to every snapshot.
    pub fn annotations(mut self, annotations: &'a Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn filter(mut self, filter: ObjectFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Offset of the `INITIAL` snapshot before the first event.
    pub fn initial_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Build the event history and replay it.
    pub fn build(self) -> Result<Replay, BuildError> {
        let associations = self.associations.ok_or(BuildError::MissingAssociations)?;
        let resolver = self.resolver.ok_or(BuildError::MissingResolver)?;

        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(BuildError::InvalidEpsilon(self.epsilon));
        }

        let history = build_event_history(associations, &self.filter);
        let mut replay = replay(&history, resolver, self.epsilon);

        if let Some(annotations) = self.annotations {
            replay.log = replay.log.annotate(annotations);
        }

        Ok(replay)
    }
}

impl<'a, R: LocationResolver + ?Sized> Default for ReplayBuilder<'a, R> {
    fn default() -> Self {
        Self::new()
    }
}
