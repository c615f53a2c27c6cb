//! Response envelope handling.
//!
//! A body with a non-null `error` field is a failure whatever the HTTP
//! status. A body with a non-null `data` field unwraps to that value.
//! Anything else is the payload itself.

use serde_json::Value;

/// Outcome of inspecting a successful-status response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Payload(Value),
    Error(String),
}

pub fn open(body: Value) -> Envelope {
    match body {
        Value::Object(mut map) => {
            if let Some(error) = map.get("error").filter(|e| !is_blank(e)) {
                return Envelope::Error(error_text(error));
            }
            match map.remove("data") {
                Some(data) if !data.is_null() => Envelope::Payload(data),
                Some(data) => {
                    map.insert("data".to_string(), data);
                    Envelope::Payload(Value::Object(map))
                }
                None => Envelope::Payload(Value::Object(map)),
            }
        }
        other => Envelope::Payload(other),
    }
}

/// Extracts a human-readable message from an error field.
pub fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
