//! Provider output parsing
//!
//! Turns raw generated text into a schema-checked [`GeneratedContent`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// == Generated Content ==
/// Content as the provider produced it, before link and related-object
/// sanitization.
///
/// Unknown fields are rejected. `links` and `relatedObjects` are kept as raw
/// JSON because malformed entries in them are dropped rather than failing
/// the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GeneratedContent {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub fun_facts: Vec<String>,
    #[serde(default)]
    pub links: Value,
    #[serde(default)]
    pub related_objects: Value,
}

/// Why provider output could not be used.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no JSON object found in provider output")]
    NotJson,

    #[error("provider output does not match the content schema: {0}")]
    Schema(String),

    #[error("provider output has an empty '{0}' field")]
    EmptyField(&'static str),
}

/// Parses and schema-checks raw provider output.
pub fn parse_generated(raw: &str) -> Result<GeneratedContent, ParseFailure> {
    let value = extract_json(raw).ok_or(ParseFailure::NotJson)?;
    // serde would otherwise accept a sequence for a struct.
    if !value.is_object() {
        return Err(ParseFailure::Schema("expected a JSON object".to_string()));
    }
    let content: GeneratedContent =
        serde_json::from_value(value).map_err(|e| ParseFailure::Schema(e.to_string()))?;

    if content.title.trim().is_empty() {
        return Err(ParseFailure::EmptyField("title"));
    }
    if content.text.trim().is_empty() {
        return Err(ParseFailure::EmptyField("text"));
    }

    Ok(content)
}

/// Parses `raw` as JSON, or failing that the span from its first `{` to its
/// last `}`.
pub fn extract_json(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }

    serde_json::from_str(&raw[start..=end]).ok()
}
