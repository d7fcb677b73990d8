//! Loading persisted inputs and writing pipeline outputs.
//!
//! Inputs are JSON documents keyed by video id. The scene log is written as
//! JSON Lines, one replayed event per line, plus a plain text rendering for
//! people to read.

use crate::annotations::Annotations;
use crate::classifier::{ExampleBank, UsageLabel};
use crate::core::{time_str, Action, SceneEntry, SceneLog};
use crate::query::PromptPayload;
use crate::tracks::{AssociationMap, MaskTable, MaskTables, VideoAssociations};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Video '{video_id}' not found in {source_name}")]
    VideoNotFound {
        video_id: String,
        source_name: &'static str,
    },

    #[error("Line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a whole JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Take one video's associations out of the full association map.
pub fn select_associations(
    mut map: AssociationMap,
    video_id: &str,
) -> Result<VideoAssociations, IoError> {
    map.remove(video_id).ok_or_else(|| IoError::VideoNotFound {
        video_id: video_id.to_string(),
        source_name: "association map",
    })
}

/// Take one video's mask table out of the full table.
pub fn select_mask_table(mut tables: MaskTables, video_id: &str) -> Result<MaskTable, IoError> {
    tables.remove(video_id).ok_or_else(|| IoError::VideoNotFound {
        video_id: video_id.to_string(),
        source_name: "mask table",
    })
}

pub fn load_associations(path: &Path, video_id: &str) -> Result<VideoAssociations, IoError> {
    let associations = select_associations(read_json(path)?, video_id)?;
    debug!(video_id, objects = associations.len(), "Loaded associations");
    Ok(associations)
}

pub fn load_mask_table(path: &Path, video_id: &str) -> Result<MaskTable, IoError> {
    let table = select_mask_table(read_json(path)?, video_id)?;
    debug!(video_id, masks = table.len(), "Loaded mask table");
    Ok(table)
}

pub fn load_annotations(path: &Path) -> Result<Annotations, IoError> {
    read_json(path)
}

pub fn load_examples(path: &Path) -> Result<ExampleBank, IoError> {
    read_json(path)
}

#[derive(Serialize)]
struct SceneLine<'a> {
    video_id: &'a str,
    time_str: String,
    #[serde(flatten)]
    entry: &'a SceneEntry,
}

#[derive(Deserialize)]
struct OwnedSceneLine {
    #[serde(flatten)]
    entry: SceneEntry,
}

/// Write the log as JSON Lines, returning the number of lines written.
pub fn write_scene_jsonl<W: Write>(
    writer: &mut W,
    video_id: &str,
    log: &SceneLog,
) -> Result<usize, IoError> {
    for entry in log.entries() {
        let line = SceneLine {
            video_id,
            time_str: time_str(entry.time),
            entry,
        };
        serde_json::to_writer(&mut *writer, &line)?;
        writer.write_all(b"\n")?;
    }
    Ok(log.len())
}

/// Read a log back from JSON Lines. Blank lines are ignored.
pub fn read_scene_jsonl<R: BufRead>(reader: R) -> Result<SceneLog, IoError> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: OwnedSceneLine = serde_json::from_str(&line).map_err(|source| IoError::Line {
            line: idx + 1,
            source,
        })?;
        entries.push(parsed.entry);
    }
    Ok(SceneLog::from_entries(entries))
}

/// Human-readable rendering of a whole log.
pub fn render_scene_log(log: &SceneLog) -> String {
    let mut lines = Vec::new();
    let mut event_num = 0usize;

    for entry in log.entries() {
        let when = format!("Time: {:.2}s ({})", entry.time, time_str(entry.time));
        match (entry.action, entry.object_name.as_deref()) {
            (Action::Initial, _) | (_, None) => lines.push(format!("Initial State | {when}")),
            (action, Some(object)) => {
                event_num += 1;
                lines.push(format!(
                    "Event #{event_num} | {when} | {}: {object}",
                    action.name()
                ));
            }
        }

        if let Some(activity) = entry.high_level_activity.describe() {
            lines.push(format!("High-Level Activity: {activity}"));
        }
        if !entry.narrations.is_empty() {
            lines.push("Active Narrations:".to_string());
            for n in &entry.narrations {
                lines.push(format!(
                    "  [{:.2}s - {:.2}s] {}",
                    n.start_timestamp, n.end_timestamp, n.narration
                ));
            }
        }

        lines.push("-".repeat(80));
        lines.push(entry.scene_graph.render(false));
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn save_scene_log(
    jsonl_path: &Path,
    text_path: Option<&Path>,
    video_id: &str,
    log: &SceneLog,
) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(jsonl_path)?);
    let written = write_scene_jsonl(&mut writer, video_id, log)?;
    writer.flush()?;

    if let Some(text_path) = text_path {
        std::fs::write(text_path, render_scene_log(log))?;
    }
    info!(video_id, entries = written, path = %jsonl_path.display(), "Scene log saved");
    Ok(())
}

pub fn load_scene_log(path: &Path) -> Result<SceneLog, IoError> {
    read_scene_jsonl(BufReader::new(File::open(path)?))
}

pub fn save_payloads(path: &Path, payloads: &[PromptPayload]) -> Result<(), IoError> {
    write_json(path, payloads)
}

pub fn load_payloads(path: &Path) -> Result<Vec<PromptPayload>, IoError> {
    read_json(path)
}

/// Labels from an earlier run, or none when no output exists yet.
pub fn load_labels(path: &Path) -> Result<Vec<UsageLabel>, IoError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_json(path)
}

pub fn save_labels(path: &Path, labels: &[UsageLabel]) -> Result<(), IoError> {
    write_json(path, labels)
}
