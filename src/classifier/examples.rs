//! Few-shot examples shown to the classifier ahead of each query.

use super::response::UsageVerdict;
use crate::query::SegmentCategory;
use serde::{Deserialize, Serialize};

/// A worked example: a rendered user prompt and the expected verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub prompt: String,
    pub response: UsageVerdict,
}

/// Examples grouped by the segment category they illustrate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleBank {
    #[serde(default)]
    pub passive: Vec<FewShotExample>,
    #[serde(default)]
    pub active: Vec<FewShotExample>,
}

impl ExampleBank {
    pub fn new(passive: Vec<FewShotExample>, active: Vec<FewShotExample>) -> Self {
        Self { passive, active }
    }

    /// Examples to show for a segment of the given category.
    pub fn for_category(&self, category: SegmentCategory) -> &[FewShotExample] {
        match category {
            SegmentCategory::Passive => &self.passive,
            SegmentCategory::Active => &self.active,
        }
    }

    pub fn len(&self) -> usize {
        self.passive.len() + self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
