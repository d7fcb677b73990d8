//! Object skip predicates.
//!
//! Tracked blobs that were never given a confident name are excluded from
//! every stage. What counts as such a blob is configurable.

use serde::{Deserialize, Serialize};

/// Declarative rule naming objects to exclude.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "marker", rename_all = "snake_case")]
pub enum SkipRule {
    /// Skip names containing the marker anywhere.
    Contains(String),
    /// Skip names starting with the marker.
    Prefix(String),
    /// Keep every object.
    Never,
}

impl Default for SkipRule {
    fn default() -> Self {
        Self::Contains("skipped".to_string())
    }
}

impl SkipRule {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(marker) => name.contains(marker.as_str()),
            Self::Prefix(marker) => name.starts_with(marker.as_str()),
            Self::Never => false,
        }
    }
}

/// Pure predicate deciding whether an object name is excluded.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::tracks::{ObjectFilter, SkipRule};
///
/// let filter = ObjectFilter::from_rule(SkipRule::Prefix("blob".to_string()));
/// assert!(filter.skips("blob_17"));
/// assert!(!filter.skips("kettle"));
///
/// let custom = ObjectFilter::new(|name| name.len() < 2);
/// assert!(custom.skips("x"));
/// ```
pub struct ObjectFilter {
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl ObjectFilter {
    /// Create a filter from a predicate returning `true` for names to skip.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        ObjectFilter {
            predicate: Box::new(predicate),
        }
    }

    pub fn from_rule(rule: SkipRule) -> Self {
        Self::new(move |name| rule.matches(name))
    }

    /// Filter that keeps every object.
    pub fn keep_all() -> Self {
        Self::new(|_| false)
    }

    pub fn skips(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

impl Default for ObjectFilter {
    fn default() -> Self {
        Self::from_rule(SkipRule::default())
    }
}

impl std::fmt::Debug for ObjectFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFilter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_skips_marked_names() {
        let filter = ObjectFilter::default();
        assert!(filter.skips("skipped_3"));
        assert!(filter.skips("obj_skipped"));
        assert!(!filter.skips("mug2"));
    }

    #[test]
    fn prefix_rule_only_matches_start() {
        let rule = SkipRule::Prefix("skip".to_string());
        assert!(rule.matches("skip_1"));
        assert!(!rule.matches("mug_skip"));
    }

    #[test]
    fn never_rule_keeps_everything() {
        let filter = ObjectFilter::from_rule(SkipRule::Never);
        assert!(!filter.skips("skipped"));
        assert!(!ObjectFilter::keep_all().skips("skipped"));
    }

    #[test]
    fn filter_is_deterministic() {
        let filter = ObjectFilter::default();
        assert_eq!(filter.skips("skipped_1"), filter.skips("skipped_1"));
    }

    #[test]
    fn rule_deserializes_from_config() {
        let rule: SkipRule =
            serde_json::from_str(r#"{"kind": "prefix", "marker": "blob"}"#).unwrap();
        assert_eq!(rule, SkipRule::Prefix("blob".to_string()));

        let never: SkipRule = serde_json::from_str(r#"{"kind": "never"}"#).unwrap();
        assert_eq!(never, SkipRule::Never);
    }
}
