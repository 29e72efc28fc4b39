use kinesis2s3_core::RawRecord;
use serde::{Deserialize, Serialize};

/// Kinesis stream event as delivered to the function
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KinesisEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<RawRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_event() {
        let json = r#"{
            "Records": [
                {
                    "kinesis": {
                        "kinesisSchemaVersion": "1.0",
                        "partitionKey": "1",
                        "sequenceNumber": "49590338271490256608559692538361571095921575989136588898",
                        "data": "eyJsb2dfdHlwZSI6ImFwcCJ9",
                        "approximateArrivalTimestamp": 1545084650.987
                    },
                    "eventSource": "aws:kinesis",
                    "eventVersion": "1.0",
                    "eventID": "shardId-000000000006:49590338271490256608559692538361571095921575989136588898",
                    "eventName": "aws:kinesis:record",
                    "awsRegion": "us-east-2"
                }
            ]
        }"#;

        let event: KinesisEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].kinesis.partition_key, "1");
        assert_eq!(event.records[0].kinesis.data, "eyJsb2dfdHlwZSI6ImFwcCJ9");
    }

    #[test]
    fn test_missing_records_is_empty_batch() {
        let event: KinesisEvent = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());
    }
}
