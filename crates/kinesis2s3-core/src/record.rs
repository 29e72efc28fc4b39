//! Kinesis stream records as delivered in the Lambda event

use serde::{Deserialize, Serialize};

/// One entry of the event's `Records` array.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub kinesis: KinesisData,
    #[serde(default, rename = "eventID", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
}

/// The `kinesis` payload of a stream record. `data` is still base64 text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisData {
    pub data: String,
    #[serde(default)]
    pub partition_key: String,
    #[serde(default)]
    pub sequence_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_arrival_timestamp: Option<f64>,
}

impl RawRecord {
    /// Build a record the way Kinesis would deliver it (mainly for tests).
    pub fn new(
        data: impl Into<String>,
        partition_key: impl Into<String>,
        sequence_number: impl Into<String>,
    ) -> Self {
        Self {
            kinesis: KinesisData {
                data: data.into(),
                partition_key: partition_key.into(),
                sequence_number: sequence_number.into(),
                approximate_arrival_timestamp: None,
            },
            event_id: None,
            event_source: Some("aws:kinesis".to_string()),
        }
    }

    pub fn sequence_number(&self) -> &str {
        &self.kinesis.sequence_number
    }
}

/// A single logical record after deaggregation, base64 already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub partition_key: String,
    pub sequence_number: String,
    /// Position inside a KPL aggregate, `None` for plain records
    pub sub_sequence_number: Option<u64>,
    pub data: Vec<u8>,
}

impl UserRecord {
    /// Identifier used in logs and errors, e.g. `4954...:3`
    pub fn display_id(&self) -> String {
        match self.sub_sequence_number {
            Some(sub) => format!("{}:{}", self.sequence_number, sub),
            None => self.sequence_number.clone(),
        }
    }
}
