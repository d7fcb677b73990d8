//! Persisted tracking inputs: associations, tracks and the mask table.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One pick-to-drop interval of a tracked object.
///
/// `masks[0]` is the pick-side location reference and `masks[1]`, when
/// present, the drop-side one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub time_segment: Vec<f64>,
    #[serde(default, deserialize_with = "mask_ids")]
    pub masks: Vec<String>,
}

impl Track {
    pub fn new(track_id: impl Into<String>, pick: f64, drop: f64) -> Self {
        Self {
            track_id: track_id.into(),
            time_segment: vec![pick, drop],
            masks: Vec::new(),
        }
    }

    /// Attach pick-side and optional drop-side mask ids.
    pub fn with_masks(mut self, pick: impl Into<String>, drop: Option<&str>) -> Self {
        self.masks = std::iter::once(pick.into())
            .chain(drop.map(str::to_string))
            .collect();
        self
    }

    pub fn pick_mask(&self) -> Option<&str> {
        self.masks.first().map(String::as_str)
    }

    pub fn drop_mask(&self) -> Option<&str> {
        self.masks.get(1).map(String::as_str)
    }
}

/// A named object identity owning its ordered tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Associations of one video, keyed by association id.
pub type VideoAssociations = BTreeMap<String, Association>;

/// Associations of every video, keyed by video id.
pub type AssociationMap = BTreeMap<String, VideoAssociations>;

/// Tracking mask and the fixture it was resolved to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskInfo {
    #[serde(default)]
    pub frame_number: Option<i64>,
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
    #[serde(default)]
    pub fixture: Option<String>,
}

/// Resolves a mask id to a fixture key.
pub trait LocationResolver {
    /// Fixture key for `mask_id`, or `None` if the mask is unknown or was
    /// never resolved to a fixture.
    fn fixture(&self, mask_id: &str) -> Option<String>;
}

/// Mask id to mask info table for one video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskTable {
    masks: HashMap<String, MaskInfo>,
}

impl MaskTable {
    pub fn new(masks: HashMap<String, MaskInfo>) -> Self {
        Self { masks }
    }

    /// Build a table directly from `(mask_id, fixture)` pairs.
    pub fn from_fixtures<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let masks = pairs
            .into_iter()
            .map(|(id, fixture)| {
                (
                    id.into(),
                    MaskInfo {
                        frame_number: None,
                        bbox: None,
                        fixture: fixture.map(Into::into),
                    },
                )
            })
            .collect();
        Self { masks }
    }

    pub fn get(&self, mask_id: &str) -> Option<&MaskInfo> {
        self.masks.get(mask_id)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

impl LocationResolver for MaskTable {
    fn fixture(&self, mask_id: &str) -> Option<String> {
        self.masks
            .get(mask_id)
            .and_then(|info| info.fixture.clone())
            .filter(|fixture| !fixture.is_empty())
    }
}

/// Mask tables of every video, keyed by video id.
pub type MaskTables = BTreeMap<String, MaskTable>;

#[derive(Deserialize)]
#[serde(untagged)]
enum MaskKey {
    Text(String),
    Number(i64),
}

fn mask_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = Vec::<MaskKey>::deserialize(deserializer)?;
    Ok(keys
        .into_iter()
        .map(|key| match key {
            MaskKey::Text(id) => id,
            MaskKey::Number(id) => id.to_string(),
        })
        .collect())
}
