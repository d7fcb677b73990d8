//! Parsing of classifier responses.

use crate::prompt::normalize_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A well-formed usage judgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageVerdict {
    pub is_used: bool,
    pub explanation: String,
}

impl UsageVerdict {
    /// JSON object form stored in label records.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "is_used": self.is_used,
            "explanation": self.explanation,
        })
    }
}

/// Reasons a raw response is rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResponseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Response is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Parse a raw response into a verdict.
///
/// Only a JSON object carrying a boolean `is_used` and a string
/// `explanation` is accepted. Anything else is an error; nothing is coerced
/// to a default.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::classifier::parse_response;
///
/// let verdict = parse_response(r#"{"is_used": true, "explanation": "boiling water"}"#).unwrap();
/// assert!(verdict.is_used);
///
/// assert!(parse_response(r#"{"is_used": "yes", "explanation": ""}"#).is_err());
/// ```
pub fn parse_response(raw: &str) -> Result<UsageVerdict, ResponseError> {
    let text = normalize_text(raw);
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| ResponseError::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(ResponseError::NotAnObject)?;

    let is_used = match object.get("is_used") {
        None => return Err(ResponseError::MissingField("is_used")),
        Some(v) => v.as_bool().ok_or(ResponseError::WrongType {
            field: "is_used",
            expected: "boolean",
        })?,
    };
    let explanation = match object.get("explanation") {
        None => return Err(ResponseError::MissingField("explanation")),
        Some(v) => v.as_str().ok_or(ResponseError::WrongType {
            field: "explanation",
            expected: "string",
        })?,
    };

    Ok(UsageVerdict {
        is_used,
        explanation: explanation.to_string(),
    })
}
