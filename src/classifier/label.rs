//! Persisted usage labels and resume bookkeeping.

use super::examples::FewShotExample;
use crate::query::{SegmentCategory, SegmentKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One classifier judgement, stored with everything needed to audit it.
///
/// An unresolved query stores an empty object in `llm_response_json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsageLabel {
    pub object_name: String,
    pub time_start: f64,
    pub time_end: f64,
    pub segment_category: SegmentCategory,
    pub llm_response_raw: Option<String>,
    pub llm_response_json: Value,
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(default)]
    pub examples: Vec<FewShotExample>,
    pub labeled_at: DateTime<Utc>,
}

impl UsageLabel {
    pub fn resume_key(&self) -> SegmentKey {
        SegmentKey::new(&self.object_name, self.time_start, self.time_end)
    }

    /// The recorded usage, if the label holds a boolean `is_used`.
    pub fn is_used(&self) -> Option<bool> {
        self.llm_response_json.get("is_used").and_then(Value::as_bool)
    }

    pub fn is_resolved(&self) -> bool {
        self.is_used().is_some()
    }
}

/// Keys of labels that need no further work.
///
/// Unresolved labels are left out so a rerun retries them.
pub fn processed_keys<'a, I>(labels: I) -> HashSet<SegmentKey>
where
    I: IntoIterator<Item = &'a UsageLabel>,
{
    labels
        .into_iter()
        .filter(|label| label.is_resolved())
        .map(UsageLabel::resume_key)
        .collect()
}
