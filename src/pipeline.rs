//! End-to-end stages for one video.
//!
//! Replay and querying are synchronous and in memory. Labelling is the only
//! async stage and works from a finished log, so an oracle outage never
//! requires replaying again.

use crate::annotations::Annotations;
use crate::checkpoint::SceneCheckpoint;
use crate::classifier::{label_payloads, processed_keys, ExampleBank, OracleEnv, UsageLabel};
use crate::config::PipelineConfig;
use crate::core::SceneLog;
use crate::error::Result;
use crate::machine::{ReplayBuilder, ReplayReport};
use crate::query::{build_payloads, PromptPayload};
use crate::tracks::{LocationResolver, VideoAssociations};
use tracing::info;

/// Replay one video and freeze the result.
///
/// The full [`ReplayReport`] is returned alongside the checkpoint, which
/// only keeps its counts.
pub fn replay_video<R: LocationResolver + ?Sized>(
    config: &PipelineConfig,
    video_id: &str,
    associations: &VideoAssociations,
    resolver: &R,
    annotations: Option<&Annotations>,
) -> Result<(SceneCheckpoint, ReplayReport)> {
    config.validate()?;

    let mut builder = ReplayBuilder::new()
        .associations(associations)
        .resolver(resolver)
        .filter(config.object_filter())
        .initial_epsilon(config.initial_epsilon);
    if let Some(annotations) = annotations {
        builder = builder.annotations(annotations);
    }
    let replay = builder.build()?;

    let checkpoint = SceneCheckpoint::new(video_id, replay.log, replay.report.summary());
    Ok((checkpoint, replay.report))
}

/// Plan and build every classifier payload for the objects in `log`.
pub fn video_payloads(
    config: &PipelineConfig,
    log: &SceneLog,
    video_end: Option<f64>,
) -> Result<Vec<PromptPayload>> {
    let objects = log.tracked_objects();
    let payloads = build_payloads(
        log,
        objects.iter().map(String::as_str),
        config.payload_options(video_end),
    )?;
    info!(objects = objects.len(), payloads = payloads.len(), "Built classifier payloads");
    Ok(payloads)
}

/// Label payloads not already resolved in `existing`, returning the
/// resolved earlier labels followed by the new ones.
pub async fn label_video(
    config: &PipelineConfig,
    env: &OracleEnv,
    payloads: &[PromptPayload],
    examples: &ExampleBank,
    existing: Vec<UsageLabel>,
) -> Vec<UsageLabel> {
    let processed = processed_keys(&existing);
    let fresh = label_payloads(
        env,
        payloads,
        examples,
        &config.retry_budget(),
        &processed,
        config.show_empty_nodes,
    )
    .await;

    let existing_count = existing.len();
    let mut labels: Vec<UsageLabel> = existing.into_iter().filter(UsageLabel::is_resolved).collect();
    info!(
        kept = labels.len(),
        dropped_unresolved = existing_count - labels.len(),
        new = fresh.len(),
        "Labelling finished"
    );
    labels.extend(fresh);
    labels
}
