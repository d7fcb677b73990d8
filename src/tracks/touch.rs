//! Touch extraction from raw tracks.
//!
//! Every track of an object is checked and all failures are reported
//! together, so a malformed object is rejected with its full list of
//! problems instead of the first one found.

use super::error::TrackError;
use super::input::Track;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Pick and drop times of one track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub pick: f64,
    pub drop: f64,
}

impl Touch {
    /// Validate a single track.
    pub fn from_track(track: &Track) -> Validation<Touch, NonEmptyVec<TrackError>> {
        let [pick, drop] = match track.time_segment.as_slice() {
            [pick, drop] => [*pick, *drop],
            other => {
                return Validation::fail(TrackError::Malformed {
                    track_id: track.track_id.clone(),
                    len: other.len(),
                })
            }
        };

        if !pick.is_finite() || !drop.is_finite() {
            return Validation::fail(TrackError::NonFinite {
                track_id: track.track_id.clone(),
                pick,
                drop,
            });
        }

        if pick < 0.0 || drop < 0.0 {
            return Validation::fail(TrackError::Negative {
                track_id: track.track_id.clone(),
                pick,
                drop,
            });
        }

        if drop < pick {
            return Validation::fail(TrackError::Reversed {
                track_id: track.track_id.clone(),
                pick,
                drop,
            });
        }

        Validation::success(Touch { pick, drop })
    }

    pub fn duration(&self) -> f64 {
        self.drop - self.pick
    }
}

/// Extract the ordered touches of one object, accumulating every failure.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::tracks::{extract_touches, Track};
///
/// let tracks = vec![Track::new("t1", 10.0, 20.0), Track::new("t2", 50.0, 60.0)];
/// let touches = extract_touches(&tracks);
/// assert!(touches.is_success());
/// ```
pub fn extract_touches(tracks: &[Track]) -> Validation<Vec<Touch>, NonEmptyVec<TrackError>> {
    let checks: Vec<Validation<Touch, NonEmptyVec<TrackError>>> =
        tracks.iter().map(Touch::from_track).collect();
    Validation::all_vec(checks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(track_id: &str, segment: Vec<f64>) -> Track {
        Track {
            track_id: track_id.to_string(),
            time_segment: segment,
            masks: Vec::new(),
        }
    }

    #[test]
    fn well_formed_tracks_become_touches() {
        let tracks = vec![Track::new("t1", 10.0, 20.0), Track::new("t2", 50.0, 60.0)];

        match extract_touches(&tracks) {
            Validation::Success(touches) => {
                assert_eq!(
                    touches,
                    vec![
                        Touch {
                            pick: 10.0,
                            drop: 20.0
                        },
                        Touch {
                            pick: 50.0,
                            drop: 60.0
                        },
                    ]
                );
            }
            Validation::Failure(_) => panic!("Expected touches, got failure"),
        }
    }

    #[test]
    fn zero_length_touch_is_valid() {
        let touch = Touch::from_track(&Track::new("t1", 4.0, 4.0));
        assert!(touch.is_success());
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let result = Touch::from_track(&raw("t9", vec![1.0, 2.0, 3.0]));

        match result {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.iter().any(|e| matches!(
                    e,
                    TrackError::Malformed { len: 3, .. }
                )));
            }
            Validation::Success(_) => panic!("Expected malformed track"),
        }
    }

    #[test]
    fn negative_time_is_rejected() {
        let result = Touch::from_track(&Track::new("t1", -1.0, 5.0));

        match result {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.iter().any(|e| matches!(
                    e,
                    TrackError::Negative { pick, .. } if *pick == -1.0
                )));
            }
            Validation::Success(_) => panic!("Expected negative track to fail"),
        }
    }

    #[test]
    fn all_failures_are_accumulated() {
        let tracks = vec![
            raw("t1", vec![5.0]),
            Track::new("t2", 10.0, 20.0),
            raw("t3", vec![30.0, 25.0]),
            raw("t4", vec![f64::NAN, 40.0]),
        ];

        match extract_touches(&tracks) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);
                let ids: Vec<&str> = errors.iter().map(|e| e.track_id()).collect();
                assert_eq!(ids, vec!["t1", "t3", "t4"]);
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn empty_track_list_yields_no_touches() {
        match extract_touches(&[]) {
            Validation::Success(touches) => assert!(touches.is_empty()),
            Validation::Failure(_) => panic!("Expected empty success"),
        }
    }
}
