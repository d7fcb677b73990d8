//! Classifier attempts, retries and labelling of prompt payloads.

use super::budget::{AttemptContext, BudgetViolation, RetryBudget};
use super::examples::ExampleBank;
use super::label::UsageLabel;
use super::oracle::{OracleEnv, OracleError};
use super::response::{parse_response, ResponseError, UsageVerdict};
use crate::prompt::{compose_query, system_prompt, user_prompt};
use crate::query::{PromptPayload, SegmentKey};
use chrono::Utc;
use std::collections::HashSet;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use stillwater::validation::Validation;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single attempt produced no verdict.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttemptError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Rejected response: {source}")]
    Response {
        raw: String,
        #[source]
        source: ResponseError,
    },
}

impl AttemptError {
    /// Raw response text, when the oracle answered at all.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Oracle(_) => None,
            Self::Response { raw, .. } => Some(raw),
        }
    }
}

/// Result of classifying one query.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassifierOutcome {
    Resolved {
        verdict: UsageVerdict,
        raw: String,
        attempts: usize,
    },
    /// Budget exhausted without a valid response. Never coerced to a
    /// default verdict.
    Unresolved {
        attempts: usize,
        last_raw: Option<String>,
        violations: Vec<BudgetViolation>,
    },
}

impl ClassifierOutcome {
    pub fn verdict(&self) -> Option<&UsageVerdict> {
        match self {
            Self::Resolved { verdict, .. } => Some(verdict),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            Self::Resolved { attempts, .. } | Self::Unresolved { attempts, .. } => *attempts,
        }
    }
}

/// A fully rendered classifier query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// One oracle call followed by response validation.
pub fn attempt(request: &ClassifierRequest) -> BoxedEffect<(UsageVerdict, String), AttemptError, OracleEnv> {
    let system = request.system_prompt.clone();
    let user = request.user_prompt.clone();
    from_fn(move |env: &OracleEnv| -> Result<(UsageVerdict, String), AttemptError> {
        let raw = env.oracle().complete(&system, &user)?;
        match parse_response(&raw) {
            Ok(verdict) => Ok((verdict, raw)),
            Err(source) => Err(AttemptError::Response { raw, source }),
        }
    })
    .boxed()
}

/// Run attempts until one yields a valid verdict or the budget is spent.
pub async fn classify(
    env: &OracleEnv,
    request: &ClassifierRequest,
    budget: &RetryBudget,
) -> ClassifierOutcome {
    let mut context = AttemptContext::first();
    let mut last_raw: Option<String> = None;

    loop {
        if let Validation::Failure(violations) = budget.enforce(&context) {
            let attempts = context.attempt - 1;
            info!(attempts, "Classifier budget exhausted without a valid response");
            return ClassifierOutcome::Unresolved {
                attempts,
                last_raw,
                violations: violations.iter().cloned().collect(),
            };
        }

        match attempt(request).run(env).await {
            Ok((verdict, raw)) => {
                debug!(attempt = context.attempt, is_used = verdict.is_used, "Classifier resolved");
                return ClassifierOutcome::Resolved {
                    verdict,
                    raw,
                    attempts: context.attempt,
                };
            }
            Err(error) => {
                warn!(
                    attempt = context.attempt,
                    max_attempts = budget.max_attempts(),
                    %error,
                    "Classifier attempt failed"
                );
                if let Some(raw) = error.raw() {
                    last_raw = Some(raw.to_string());
                }
            }
        }

        context = context.next();
    }
}

/// Render, classify and record one payload.
pub async fn label_payload(
    env: &OracleEnv,
    payload: &PromptPayload,
    examples: &ExampleBank,
    budget: &RetryBudget,
    show_empty: bool,
) -> UsageLabel {
    let chosen = examples.for_category(payload.segment_category).to_vec();
    let user = user_prompt(payload, show_empty);
    let request = ClassifierRequest {
        system_prompt: system_prompt(),
        user_prompt: compose_query(&chosen, &user),
    };

    let outcome = classify(env, &request, budget).await;
    let (raw, json) = match outcome {
        ClassifierOutcome::Resolved { verdict, raw, .. } => (Some(raw), verdict.to_json()),
        ClassifierOutcome::Unresolved { last_raw, .. } => {
            (last_raw, serde_json::Value::Object(serde_json::Map::new()))
        }
    };

    UsageLabel {
        object_name: payload.object_name.clone(),
        time_start: payload.time_start,
        time_end: payload.time_end,
        segment_category: payload.segment_category,
        llm_response_raw: raw,
        llm_response_json: json,
        system_prompt: request.system_prompt,
        user_prompt: user,
        examples: chosen,
        labeled_at: Utc::now(),
    }
}

/// Label every payload whose key is not in `processed`, in order.
///
/// One payload failing never stops the rest; its label is simply
/// unresolved.
pub async fn label_payloads(
    env: &OracleEnv,
    payloads: &[PromptPayload],
    examples: &ExampleBank,
    budget: &RetryBudget,
    processed: &HashSet<SegmentKey>,
    show_empty: bool,
) -> Vec<UsageLabel> {
    let total = payloads.len();
    let mut labels = Vec::new();

    for (idx, payload) in payloads.iter().enumerate() {
        if processed.contains(&payload.key()) {
            debug!(
                object = %payload.object_name,
                time_start = payload.time_start,
                time_end = payload.time_end,
                "Skipping already labelled segment"
            );
            continue;
        }
        info!(
            entry = idx + 1,
            total,
            object = %payload.object_name,
            time_start = payload.time_start,
            time_end = payload.time_end,
            "Labelling segment"
        );
        labels.push(label_payload(env, payload, examples, budget, show_empty).await);
    }

    labels
}
