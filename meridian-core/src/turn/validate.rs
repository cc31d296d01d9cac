//! Validation of raw service output into a [`StructuredResponse`].
//!
//! Two failure classes: the payload is not well-formed JSON at all
//! ([`ValidateError::Parse`]), or it is JSON but missing its required fields
//! ([`ValidateError::Schema`]). An out-of-range `trustChange` is neither — it
//! is clamped into [-10, 10], trusting the service to mean "strong
//! positive/negative" even when it overshoots. Revelations are decoded
//! defensively: malformed entries are dropped, never fatal.

use crate::dossier::Associate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smallest trust delta a single turn may apply.
pub const TRUST_CHANGE_MIN: i32 = -10;
/// Largest trust delta a single turn may apply.
pub const TRUST_CHANGE_MAX: i32 = 10;

/// Why a raw service payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("Response payload is not well-formed JSON: {0}")]
    Parse(String),

    #[error("Invalid response structure: {0}")]
    Schema(String),
}

/// A biography addition delivered alongside a reply.
///
/// The section tag is kept verbatim; routing (and the decision to ignore
/// unrecognized tags) belongs to the merger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiographyUpdate {
    pub section: String,
    pub content: String,
}

/// Service-provided additions to a dossier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revelations {
    pub new_associates: Vec<Associate>,
    pub biography_updates: Vec<BiographyUpdate>,
}

impl Revelations {
    pub fn is_empty(&self) -> bool {
        self.new_associates.is_empty() && self.biography_updates.is_empty()
    }
}

/// A validated turn response, ready for merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResponse {
    /// In-character reply text; never empty.
    pub response: String,
    /// Trust delta, already clamped to [-10, 10].
    pub trust_change: i32,
    #[serde(default)]
    pub revelations: Revelations,
}

/// Parse and validate a raw payload string.
pub fn validate_payload(raw: &str) -> Result<StructuredResponse, ValidateError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ValidateError::Parse(e.to_string()))?;
    validate_value(&value)
}

/// Validate an already-parsed payload.
pub fn validate_value(value: &Value) -> Result<StructuredResponse, ValidateError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidateError::Parse("payload is not a JSON object".to_string()))?;

    let response = object
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidateError::Schema("missing or non-string 'response'".to_string()))?;
    if response.trim().is_empty() {
        return Err(ValidateError::Schema("'response' is empty".to_string()));
    }

    let trust_change = object
        .get("trustChange")
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidateError::Schema("missing or non-numeric 'trustChange'".to_string()))?;
    let trust_change = (trust_change.round() as i32).clamp(TRUST_CHANGE_MIN, TRUST_CHANGE_MAX);

    Ok(StructuredResponse {
        response: response.to_string(),
        trust_change,
        revelations: decode_revelations(object.get("revelations")),
    })
}

/// Best-effort decoding of the revelations block. Missing sub-arrays default
/// to empty; entries that do not fit the expected shape are dropped.
fn decode_revelations(value: Option<&Value>) -> Revelations {
    let Some(block) = value.and_then(Value::as_object) else {
        return Revelations::default();
    };

    let mut revelations = Revelations::default();

    if let Some(entries) = block.get("newAssociates").and_then(Value::as_array) {
        for entry in entries {
            let Some(name) = entry.get("name").and_then(Value::as_str) else {
                tracing::debug!("dropping associate revelation without a name");
                continue;
            };
            if name.is_empty() {
                continue;
            }
            revelations.new_associates.push(Associate {
                name: name.to_string(),
                relationship: string_or_empty(entry.get("relationship")),
                details: string_or_empty(entry.get("details")),
            });
        }
    }

    if let Some(entries) = block.get("biographyUpdates").and_then(Value::as_array) {
        for entry in entries {
            let section = entry.get("section").and_then(Value::as_str);
            let content = entry.get("content").and_then(Value::as_str);
            match (section, content) {
                (Some(section), Some(content)) if !content.is_empty() => {
                    revelations.biography_updates.push(BiographyUpdate {
                        section: section.to_string(),
                        content: content.to_string(),
                    });
                }
                _ => tracing::debug!("dropping malformed biography revelation"),
            }
        }
    }

    revelations
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
