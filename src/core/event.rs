//! Atomic scene events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker carried by a location reference that could not be resolved.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Kind of transition recorded in a scene log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Synthetic anchor placed before the first real event.
    Initial,
    Pick,
    Drop,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Pick => "PICK",
            Self::Drop => "DROP",
        }
    }

    /// Verb used when describing the action to a reader.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Initial => "start",
            Self::Pick => "pick up",
            Self::Drop => "put down",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque reference to a location, resolved externally to a fixture.
///
/// Serialises as the bare mask id, with [`LocationRef::Unknown`] written as
/// the string `"unknown"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationRef {
    Mask(String),
    Unknown,
}

impl LocationRef {
    pub fn mask_id(&self) -> Option<&str> {
        match self {
            Self::Mask(id) => Some(id),
            Self::Unknown => None,
        }
    }
}

impl From<String> for LocationRef {
    fn from(id: String) -> Self {
        if id.is_empty() || id == UNKNOWN_LOCATION {
            Self::Unknown
        } else {
            Self::Mask(id)
        }
    }
}

impl From<Option<String>> for LocationRef {
    fn from(id: Option<String>) -> Self {
        id.map_or(Self::Unknown, Self::from)
    }
}

impl From<LocationRef> for String {
    fn from(location: LocationRef) -> Self {
        match location {
            LocationRef::Mask(id) => id,
            LocationRef::Unknown => UNKNOWN_LOCATION.to_string(),
        }
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mask(id) => f.write_str(id),
            Self::Unknown => f.write_str(UNKNOWN_LOCATION),
        }
    }
}

/// One endpoint of a track: an object picked up or put down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub action: Action,
    pub object_name: String,
    pub location: LocationRef,
    /// Position of this event within its object's own event sequence.
    /// Used to keep same-object events causal when timestamps tie.
    pub ordinal: usize,
}

/// Format whole seconds as `MM:SS`.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::core::time_str;
///
/// assert_eq!(time_str(75.9), "01:15");
/// assert_eq!(time_str(3600.0), "60:00");
/// ```
pub fn time_str(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
