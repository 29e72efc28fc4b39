//! Payload normalization
//!
//! Decoded text is either a single JSON log record, or a CloudWatch Logs
//! subscription envelope wrapping many records:
//!
//! ```json
//! {"messageType": "DATA_MESSAGE", "logGroup": "...", "logEvents": [
//!     {"id": "...", "timestamp": 1700000000000, "message": "{\"log_type\":\"app\"}"}
//! ]}
//! ```
//!
//! Two channels come out of here. Records that are merely unusable are
//! reported as [`Skip`] and processing continues; an envelope with an
//! unrecognized `messageType` is a protocol violation and returns
//! [`NormalizeError`], which aborts the invocation.

use serde_json::Value;
use std::fmt;

use crate::entry::LogEntry;
use crate::error::NormalizeError;

pub const MESSAGE_TYPE_FIELD: &str = "messageType";
pub const DATA_MESSAGE: &str = "DATA_MESSAGE";
pub const CONTROL_MESSAGE: &str = "CONTROL_MESSAGE";
const LOG_EVENTS_FIELD: &str = "logEvents";
const MESSAGE_FIELD: &str = "message";

/// Why a payload (or part of one) produced no log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Decoded text was empty
    EmptyPayload,
    /// Payload is not JSON
    NotJson,
    /// Payload is JSON but not an object
    NotAnObject,
    /// A subscription event whose `message` is missing or not a JSON object
    InvalidEvent { index: usize },
    /// `DATA_MESSAGE` without a `logEvents` list
    MissingLogEvents,
    /// Subscription keep-alive, nothing to keep
    ControlMessage,
}

impl Skip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "empty_payload",
            Self::NotJson => "not_json",
            Self::NotAnObject => "not_an_object",
            Self::InvalidEvent { .. } => "invalid_event",
            Self::MissingLogEvents => "missing_log_events",
            Self::ControlMessage => "control_message",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEvent { index } => write!(f, "invalid_event[{}]", index),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Entries extracted from one payload, plus whatever was dropped on the way
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Normalized {
    pub entries: Vec<LogEntry>,
    pub skipped: Vec<Skip>,
}

impl Normalized {
    fn skip(reason: Skip) -> Self {
        Self {
            entries: Vec::new(),
            skipped: vec![reason],
        }
    }

    fn single(entry: LogEntry) -> Self {
        Self {
            entries: vec![entry],
            skipped: Vec::new(),
        }
    }
}

/// Normalize decoded record text into zero or more log entries.
pub fn normalize(text: &str) -> Result<Normalized, NormalizeError> {
    if text.is_empty() {
        tracing::warn!("Got empty record, skipping");
        return Ok(Normalized::skip(Skip::EmptyPayload));
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, payload = %truncate(text), "Non-JSON data found, skipping");
            return Ok(Normalized::skip(Skip::NotJson));
        }
    };

    let Value::Object(mut object) = value else {
        tracing::warn!(payload = %truncate(text), "JSON payload is not an object, skipping");
        return Ok(Normalized::skip(Skip::NotAnObject));
    };

    let Some(message_type) = object.get(MESSAGE_TYPE_FIELD).cloned() else {
        return Ok(Normalized::single(LogEntry::new(object)));
    };

    match message_type.as_str() {
        Some(DATA_MESSAGE) => {
            let Some(Value::Array(events)) = object.remove(LOG_EVENTS_FIELD) else {
                tracing::error!(
                    log_group = ?object.get("logGroup"),
                    "Got DATA_MESSAGE but logEvents are not present, skipping payload"
                );
                return Ok(Normalized::skip(Skip::MissingLogEvents));
            };
            Ok(unwrap_log_events(events))
        }
        Some(CONTROL_MESSAGE) => {
            tracing::info!("Got CONTROL_MESSAGE from CloudWatch Logs, skipping");
            Ok(Normalized::skip(Skip::ControlMessage))
        }
        _ => {
            let message_type = message_type.to_string();
            tracing::error!(message_type = %message_type, "Got unknown messageType");
            Err(NormalizeError::UnknownMessageType { message_type })
        }
    }
}

fn unwrap_log_events(events: Vec<Value>) -> Normalized {
    let mut out = Normalized::default();

    for (index, event) in events.into_iter().enumerate() {
        let parsed = event
            .get(MESSAGE_FIELD)
            .and_then(Value::as_str)
            .and_then(|message| serde_json::from_str::<Value>(message).ok())
            .and_then(LogEntry::from_value);

        match parsed {
            Some(entry) => out.entries.push(entry),
            None => {
                tracing::debug!(index, event = %event, "Non-JSON data found inside log event, skipping");
                out.skipped.push(Skip::InvalidEvent { index });
            }
        }
    }

    out
}

fn truncate(text: &str) -> &str {
    const MAX: usize = 256;
    if text.len() <= MAX {
        return text;
    }
    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
