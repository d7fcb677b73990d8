//! Summary of everything a replay recovered from.

use super::error::InvariantViolation;
use crate::tracks::RejectedObject;
use serde::{Deserialize, Serialize};

/// Problems encountered while building a scene log.
///
/// None of these abort the replay; they are collected so callers can audit
/// how much of the input was usable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayReport {
    /// Objects excluded by the skip filter.
    pub skipped_objects: Vec<String>,
    /// Objects rejected for malformed tracks or duplicate names.
    pub rejected: Vec<RejectedObject>,
    /// Invariant violations; each one poisons its object for the rest of
    /// the replay.
    pub violations: Vec<InvariantViolation>,
    /// Mask ids that did not resolve to a fixture.
    pub unresolved_refs: Vec<String>,
    /// DROP events carrying no drop-side reference at all.
    pub unknown_drops: usize,
    pub applied_events: usize,
    /// Events dropped because their object was poisoned earlier.
    pub skipped_events: usize,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.violations.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            applied_events: self.applied_events,
            skipped_events: self.skipped_events,
            skipped_objects: self.skipped_objects.len(),
            rejected_objects: self.rejected.len(),
            violations: self.violations.len(),
            unresolved_refs: self.unresolved_refs.len(),
            unknown_drops: self.unknown_drops,
        }
    }
}

/// Counts-only view of a [`ReplayReport`], suitable for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub applied_events: usize,
    pub skipped_events: usize,
    pub skipped_objects: usize,
    pub rejected_objects: usize,
    pub violations: usize,
    pub unresolved_refs: usize,
    pub unknown_drops: usize,
}
