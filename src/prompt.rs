//! Prompt text for the usage classifier.
//!
//! Everything here is plain string rendering over query results. All text
//! that leaves the crate goes through [`normalize_text`] first.

use crate::classifier::FewShotExample;
use crate::core::{time_str, Action, SceneGraph};
use crate::query::{EventRecord, PromptPayload};

const RESPONSE_FORMAT: &str = "{
  'is_used': true/false,
  'explanation': 'Step-by-step Chain of Thought reasoning explaining your decision...'
}";

const SYSTEM_PROMPT: &str = "You are an expert in analyzing kitchen activities to determine if an object is being used during a specific time period. Your task is to determine whether a given object is being used during a specified time period, along with a clear explanation of your reasoning.

You will be given a history of events that occurred during the time period. The events include:
    - High-level activity
    - Low-level action narrations
    - Current object locations (e.g., in the person's hand, on the countertop, etc.)
    - Atomic actions such as picking up and placing down

An object is considered 'being used' if it is contributing to the high-level activity, either by actively being held by the person or passively performing a function as part of the high-level activity.
Analyze the evidence step-by-step before providing your final answer, and provide a clear explanation of your reasoning. Think through the following questions:
    1. If the object is in the person's hand during this period, is the person using this object to perform the high-level activity? Otherwise, it is not being used.
    2. If the object is not in the person's hand during this period, is the object meaningfully contributing to the task being performed? Otherwise, it is not being used.

Provide your analysis using Chain of Thought reasoning, and respond with the following JSON structure:";

/// Replace typographic punctuation and invisible characters with plain
/// ASCII, and strip control characters other than tab and newline.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::prompt::normalize_text;
///
/// assert_eq!(normalize_text("it\u{2019}s \u{201C}hot\u{201D}\u{2026}"), "it's \"hot\"...");
/// ```
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2011}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => {}
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Instructions sent as the system message of every query.
pub fn system_prompt() -> String {
    normalize_text(&format!("{SYSTEM_PROMPT}\n{RESPONSE_FORMAT}"))
}

/// Render a scene graph with fixture prefixes removed.
pub fn render_scene_graph(graph: &SceneGraph, show_empty: bool) -> String {
    graph.render_with(show_empty, |node| node.display_name().to_string())
}

fn list_or_empty(items: &[String]) -> String {
    if items.is_empty() {
        "[]".to_string()
    } else {
        items.join(", ")
    }
}

/// Render one event record as a block of lines.
pub fn render_event_record(record: &EventRecord, show_empty: bool) -> String {
    let mut lines = vec![
        format!("Time: {} ({:.2}s)", record.time_str, record.time),
        format!(
            "High-level task being performed: {}",
            record.high_level_activity.as_deref().unwrap_or("unknown")
        ),
    ];

    if !record.action_narrations.is_empty() {
        lines.push("Current scene narration:".to_string());
        lines.extend(record.action_narrations.iter().map(|n| format!("  - {n}")));
    }

    match &record.full_scene_graph {
        Some(graph) => {
            lines.push("Object locations before human action:".to_string());
            lines.push(render_scene_graph(graph, show_empty));
        }
        None => {
            lines.push(format!(
                "Objects currently in hand: {}",
                list_or_empty(&record.objects_in_hand)
            ));
            lines.push(format!(
                "Objects currently at `{}`: {}",
                record.fixture,
                list_or_empty(&record.nearby_objects_fixture)
            ));
        }
    }

    let preposition = match record.action {
        Action::Pick => "from",
        _ => "to",
    };
    lines.push(format!(
        "Human atomic action: {} `{}` {} `{}`",
        record.action.verb(),
        record.object,
        preposition,
        record.fixture
    ));

    lines.join("\n")
}

/// Render an event history, one block per event, each followed by a blank
/// line.
pub fn render_event_history(records: &[EventRecord], show_empty: bool) -> String {
    records
        .iter()
        .map(|r| format!("{}\n", render_event_record(r, show_empty)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The question asked about one payload.
pub fn user_prompt(payload: &PromptPayload, show_empty: bool) -> String {
    let history = render_event_history(&payload.event_history, show_empty);
    normalize_text(&format!(
        "Determine if the object '{}' is being used during the time period between {} ({:.2}s) and {} ({:.2}s).

Analyze the event history before providing your final answer using step-by-step Chain of Thought reasoning.

Event History:
{}

Respond with the following JSON structure:
{}",
        payload.object_name,
        time_str(payload.time_start),
        payload.time_start,
        time_str(payload.time_end),
        payload.time_end,
        history,
        RESPONSE_FORMAT,
    ))
}

/// Render worked examples as a numbered block.
pub fn render_examples(examples: &[FewShotExample]) -> String {
    let mut out = String::from("Examples:");
    for (i, example) in examples.iter().enumerate() {
        out.push_str(&format!(
            "\nExample {}:\n{}\n\nResponse: {{\n    'is_used': {},\n    'explanation': '{}'\n}}\n",
            i + 1,
            example.prompt,
            example.response.is_used,
            example.response.explanation,
        ));
    }
    normalize_text(&out)
}

/// The full user message: worked examples followed by the question.
/// Without examples the question is sent alone.
pub fn compose_query(examples: &[FewShotExample], user_prompt: &str) -> String {
    if examples.is_empty() {
        normalize_text(user_prompt)
    } else {
        format!("{}\n\n{}", render_examples(examples), normalize_text(user_prompt))
    }
}
