//! Activity and narration annotations attached to replayed events.
//!
//! Both sources are read-only tables loaded up front. Each scene log entry
//! gets the high-level activity active at its time and every narration span
//! covering it.

use serde::{Deserialize, Serialize};

/// High-level activity active at a point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub high_level_activity_label: Option<String>,
    pub recipe_id: Option<String>,
}

impl ActivityInfo {
    /// Label with the recipe appended, e.g. `boil water [Recipe: R03]`.
    pub fn describe(&self) -> Option<String> {
        let label = self.high_level_activity_label.as_ref()?;
        Some(match &self.recipe_id {
            Some(recipe) => format!("{label} [Recipe: {recipe}]"),
            None => label.clone(),
        })
    }
}

/// End of an activity row: a timestamp, or a marker such as `"end"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityEnd {
    Seconds(f64),
    Marker(String),
}

impl ActivityEnd {
    fn is_video_end(&self) -> bool {
        matches!(self, Self::Marker(marker) if marker.eq_ignore_ascii_case("end"))
    }

    fn resolve(&self, video_end: Option<f64>) -> f64 {
        let fallback = video_end.unwrap_or(f64::INFINITY);
        match self {
            Self::Seconds(seconds) => *seconds,
            Self::Marker(marker) => marker.trim().parse().unwrap_or(fallback),
        }
    }
}

/// One row of the high-level activity table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub start_time: f64,
    pub end_time: ActivityEnd,
    #[serde(default)]
    pub high_level_activity_label: Option<String>,
    #[serde(default)]
    pub recipe_id: Option<String>,
}

/// A narrated action span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub narration: String,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
}

/// Annotation tables for one video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub activities: Vec<ActivityRow>,
    #[serde(default)]
    pub narrations: Vec<Narration>,
}

impl Annotations {
    pub fn new(activities: Vec<ActivityRow>, narrations: Vec<Narration>) -> Self {
        Self {
            activities,
            narrations,
        }
    }

    /// Activity containing `time`.
    ///
    /// Regular rows are half-open (`start <= t < end`) because consecutive
    /// activities share boundaries. A row ending at the `"end"` marker is
    /// closed up to `video_end`.
    pub fn activity_at(&self, time: f64, video_end: Option<f64>) -> ActivityInfo {
        self.activities
            .iter()
            .find(|row| {
                let end = row.end_time.resolve(video_end);
                if row.end_time.is_video_end() {
                    row.start_time <= time && time <= end
                } else {
                    row.start_time <= time && time < end
                }
            })
            .map(|row| ActivityInfo {
                high_level_activity_label: row.high_level_activity_label.clone(),
                recipe_id: row.recipe_id.clone(),
            })
            .unwrap_or_default()
    }

    /// Narrations covering `time`, ordered by start.
    pub fn narrations_at(&self, time: f64) -> Vec<Narration> {
        let mut active: Vec<Narration> = self
            .narrations
            .iter()
            .filter(|n| n.start_timestamp <= time && time <= n.end_timestamp)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.start_timestamp.total_cmp(&b.start_timestamp));
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(start: f64, end: ActivityEnd, label: &str) -> ActivityRow {
        ActivityRow {
            start_time: start,
            end_time: end,
            high_level_activity_label: Some(label.to_string()),
            recipe_id: None,
        }
    }

    fn narration(text: &str, start: f64, end: f64) -> Narration {
        Narration {
            narration: text.to_string(),
            start_timestamp: start,
            end_timestamp: end,
        }
    }

    #[test]
    fn regular_activity_end_is_exclusive() {
        let annotations = Annotations::new(
            vec![
                row(0.0, ActivityEnd::Seconds(30.0), "prepare tea"),
                row(30.0, ActivityEnd::Seconds(60.0), "wash up"),
            ],
            vec![],
        );

        let at_boundary = annotations.activity_at(30.0, None);
        assert_eq!(
            at_boundary.high_level_activity_label.as_deref(),
            Some("wash up")
        );
    }

    #[test]
    fn end_marker_activity_includes_video_end() {
        let annotations = Annotations::new(
            vec![row(10.0, ActivityEnd::Marker("END".to_string()), "eat")],
            vec![],
        );

        let info = annotations.activity_at(90.0, Some(90.0));
        assert_eq!(info.high_level_activity_label.as_deref(), Some("eat"));
        assert_eq!(annotations.activity_at(90.5, Some(90.0)), ActivityInfo::default());
    }

    #[test]
    fn no_matching_activity_is_empty() {
        let annotations = Annotations::default();
        assert_eq!(annotations.activity_at(5.0, None), ActivityInfo::default());
    }

    #[test]
    fn describe_appends_recipe() {
        let info = ActivityInfo {
            high_level_activity_label: Some("make pasta".to_string()),
            recipe_id: Some("R07".to_string()),
        };
        assert_eq!(info.describe().as_deref(), Some("make pasta [Recipe: R07]"));
        assert_eq!(ActivityInfo::default().describe(), None);
    }

    #[test]
    fn narrations_at_are_inclusive_and_sorted() {
        let annotations = Annotations::new(
            vec![],
            vec![
                narration("open tap", 4.0, 9.0),
                narration("pick up kettle", 2.0, 5.0),
                narration("close tap", 9.5, 11.0),
            ],
        );

        let active = annotations.narrations_at(5.0);
        let texts: Vec<&str> = active.iter().map(|n| n.narration.as_str()).collect();
        assert_eq!(texts, vec!["pick up kettle", "open tap"]);
    }

    #[test]
    fn activity_end_deserializes_number_or_marker() {
        let seconds: ActivityEnd = serde_json::from_str("42.5").unwrap();
        assert_eq!(seconds, ActivityEnd::Seconds(42.5));
        let marker: ActivityEnd = serde_json::from_str("\"end\"").unwrap();
        assert!(marker.is_video_end());
    }
}
