//! Event history construction.
//!
//! Flattens every kept object's touches into one time-ordered list of PICK
//! and DROP events. Objects that are skipped, malformed or duplicated are
//! reported and contribute nothing.

use super::error::TrackError;
use super::filter::ObjectFilter;
use super::input::{Association, VideoAssociations};
use super::touch::{extract_touches, Touch};
use crate::core::{Action, Event, LocationRef};
use std::cmp::Ordering;
use std::collections::HashMap;
use stillwater::validation::Validation;
use tracing::{debug, warn};

/// An object that passed validation, with its seed location.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    pub assoc_id: String,
    pub name: String,
    pub touches: Vec<Touch>,
    /// Pick-side reference of the first track, used to seed the graph.
    pub first_pick: LocationRef,
}

/// Why an association was excluded from the history.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    Malformed(Vec<TrackError>),
    DuplicateName { first_assoc_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RejectedObject {
    pub assoc_id: String,
    pub name: String,
    pub reason: Rejection,
}

/// Output of the event history builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventHistory {
    /// Kept objects with at least one track, in association id order.
    pub objects: Vec<TrackedObject>,
    /// All events, sorted by [`event_order`].
    pub events: Vec<Event>,
    /// Names excluded by the skip filter.
    pub skipped: Vec<String>,
    pub rejected: Vec<RejectedObject>,
}

/// Total order used to replay events.
///
/// Events sort by time, then by object name, then by their position within
/// the object's own sequence. Two events of one object at the same instant
/// therefore replay in track order (a PICK before its own DROP, a DROP
/// before the next track's PICK).
pub fn event_order(a: &Event, b: &Event) -> Ordering {
    a.time
        .total_cmp(&b.time)
        .then_with(|| a.object_name.cmp(&b.object_name))
        .then_with(|| a.ordinal.cmp(&b.ordinal))
}

/// Emit the PICK and DROP events of one object's touches.
pub fn object_events(name: &str, association: &Association, touches: &[Touch]) -> Vec<Event> {
    association
        .tracks
        .iter()
        .zip(touches)
        .enumerate()
        .flat_map(|(idx, (track, touch))| {
            let pick = Event {
                time: touch.pick,
                action: Action::Pick,
                object_name: name.to_string(),
                location: LocationRef::from(track.pick_mask().map(str::to_string)),
                ordinal: 2 * idx,
            };
            let drop = Event {
                time: touch.drop,
                action: Action::Drop,
                object_name: name.to_string(),
                location: LocationRef::from(track.drop_mask().map(str::to_string)),
                ordinal: 2 * idx + 1,
            };
            [pick, drop]
        })
        .collect()
}

/// Build the globally ordered event history for one video.
pub fn build_event_history(associations: &VideoAssociations, filter: &ObjectFilter) -> EventHistory {
    let mut history = EventHistory::default();
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for (assoc_id, association) in associations {
        let name = association.name.as_str();

        if filter.skips(name) {
            debug!(assoc_id = %assoc_id, object = name, "Skipping object");
            history.skipped.push(name.to_string());
            continue;
        }

        if let Some(first) = owners.get(name) {
            warn!(
                assoc_id = %assoc_id,
                first_assoc_id = %first,
                object = name,
                "Duplicate object name, keeping first association"
            );
            history.rejected.push(RejectedObject {
                assoc_id: assoc_id.clone(),
                name: name.to_string(),
                reason: Rejection::DuplicateName {
                    first_assoc_id: first.to_string(),
                },
            });
            continue;
        }

        let touches = match extract_touches(&association.tracks) {
            Validation::Success(touches) => touches,
            Validation::Failure(errors) => {
                for error in errors.iter() {
                    warn!(assoc_id = %assoc_id, object = name, %error, "Malformed track");
                }
                history.rejected.push(RejectedObject {
                    assoc_id: assoc_id.clone(),
                    name: name.to_string(),
                    reason: Rejection::Malformed(errors.iter().cloned().collect()),
                });
                continue;
            }
        };

        owners.insert(name, assoc_id.as_str());

        let Some(first_track) = association.tracks.first() else {
            debug!(assoc_id = %assoc_id, object = name, "Object has no tracks");
            continue;
        };

        history
            .events
            .extend(object_events(name, association, &touches));
        history.objects.push(TrackedObject {
            assoc_id: assoc_id.clone(),
            name: name.to_string(),
            first_pick: LocationRef::from(first_track.pick_mask().map(str::to_string)),
            touches,
        });
    }

    history.events.sort_by(event_order);
    history
}
