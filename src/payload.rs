//! Backend error payload normalization.
//!
//! Error bodies come back in whatever shape the backend felt like producing.
//! [`normalize`] pulls the conventional keys out of an arbitrary JSON value
//! without ever failing:
//!
//! ```json
//! { "statusCode": 400, "message": "Bad input", "error": "Bad Request",
//!   "errors": [{ "field": "email", "message": "invalid" }] }
//! ```
//!
//! Keys that are missing or have the wrong type come back as `None`, so
//! "not present" stays distinguishable from "present but empty".

use serde_json::{Map, Value};

/// `message` as sent by the backend: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    Single(String),
    Many(Vec<String>),
}

impl BackendMessage {
    /// The message as one line, list entries joined with a space.
    pub fn joined(&self) -> String {
        match self {
            Self::Single(message) => message.clone(),
            Self::Many(messages) => messages.join(" "),
        }
    }
}

/// Canonical view of a backend error body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendErrorPayload {
    /// `statusCode`, when it is an integer.
    pub status_code: Option<i64>,
    /// `message`, when it is a string or an array of strings.
    pub message: Option<BackendMessage>,
    /// `error`, when it is a string.
    pub error_summary: Option<String>,
    /// `errors`, passed through untouched. Consumers check the shape.
    pub details: Option<Value>,
}

impl BackendErrorPayload {
    /// Best user-facing text the backend provided: the message, else the
    /// summary. Blank strings count as absent.
    pub fn display_message(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(BackendMessage::joined)
            .and_then(non_blank)
            .or_else(|| self.error_summary.clone().and_then(non_blank))
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extract the canonical record from an arbitrary body. Never fails.
pub fn normalize(body: Option<&Value>) -> BackendErrorPayload {
    let Some(Value::Object(object)) = body else {
        return BackendErrorPayload::default();
    };

    BackendErrorPayload {
        status_code: status_code(object),
        message: message(object),
        error_summary: object
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string),
        details: object.get("errors").cloned(),
    }
}

fn status_code(object: &Map<String, Value>) -> Option<i64> {
    object.get("statusCode").and_then(Value::as_i64)
}

fn message(object: &Map<String, Value>) -> Option<BackendMessage> {
    match object.get("message")? {
        Value::String(message) => Some(BackendMessage::Single(message.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(BackendMessage::Many),
        _ => None,
    }
}

/// Decode a raw response body.
///
/// Empty bodies give `None`. Bodies that are not JSON are kept as a JSON
/// string so they stay available for diagnostics.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
