//! Quick-reply button decoding
//!
//! The server sends buttons as a JSON-encoded string (`"[\"Yes\",\"No\"]"`).
//! Some deployments send the array directly, and older ones send objects
//! with a `text` field. All of them end up as a plain list of labels.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ButtonParseError {
    #[error("buttons string is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("buttons must be an array, got {0}")]
    NotAnArray(&'static str),
    #[error("button #{0} has no usable label")]
    BadEntry(usize),
}

/// Decode a raw `buttons` value into labels.
///
/// `null`, a missing field, and an empty/blank string all mean "no buttons".
/// Blank labels are skipped.
pub fn parse_buttons(raw: &Value) -> Result<Vec<String>, ButtonParseError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::String(encoded) => {
            if encoded.trim().is_empty() {
                return Ok(Vec::new());
            }
            let decoded: Value = serde_json::from_str(encoded)
                .map_err(|e| ButtonParseError::InvalidJson(e.to_string()))?;
            // A string that decodes to another string is not a button list
            match decoded {
                Value::Array(items) => labels_from_array(&items),
                Value::Null => Ok(Vec::new()),
                other => Err(ButtonParseError::NotAnArray(type_name(&other))),
            }
        }
        Value::Array(items) => labels_from_array(items),
        other => Err(ButtonParseError::NotAnArray(type_name(other))),
    }
}

/// Like [`parse_buttons`], but drops invalid input so the view falls back to
/// the free-text box.
pub fn parse_buttons_lenient(raw: &Value) -> Vec<String> {
    match parse_buttons(raw) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unparseable quick-reply buttons");
            Vec::new()
        }
    }
}

fn labels_from_array(items: &[Value]) -> Result<Vec<String>, ButtonParseError> {
    let mut labels = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let label = match item {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map
                .get("text")
                .or_else(|| map.get("label"))
                .and_then(Value::as_str)
                .ok_or(ButtonParseError::BadEntry(idx))?,
            _ => return Err(ButtonParseError::BadEntry(idx)),
        };
        let label = label.trim();
        if !label.is_empty() {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
