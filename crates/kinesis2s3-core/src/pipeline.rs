//! Decode phase of a batch: stream records in, populated buckets out
//!
//! Records are processed strictly in order. Any fatal error aborts the whole
//! batch so Kinesis can redeliver it; nothing has been written at that point.

use crate::bucket::BucketMap;
use crate::classify::{ClassifyStats, Classifier};
use crate::deaggregate::deaggregate;
use crate::decode::decode_payload;
use crate::error::PipelineError;
use crate::normalize::{normalize, Skip};
use crate::record::RawRecord;

/// Result of the decode phase for one batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub buckets: BucketMap,
    /// Records delivered by the stream
    pub records: usize,
    /// Records after KPL deaggregation
    pub user_records: usize,
    pub skipped: Vec<Skip>,
    pub stats: ClassifyStats,
}

impl BatchOutcome {
    pub fn entry_count(&self) -> usize {
        self.buckets.entry_count()
    }
}

/// Decode, normalize and classify every record of a batch.
pub fn decode_and_classify(
    records: &[RawRecord],
    classifier: &mut Classifier,
) -> Result<BatchOutcome, PipelineError> {
    let user_records = deaggregate(records)?;

    let mut outcome = BatchOutcome {
        records: records.len(),
        user_records: user_records.len(),
        ..Default::default()
    };

    for record in user_records {
        let id = record.display_id();
        let text = decode_payload(record.data).map_err(|source| {
            tracing::error!(record = %id, error = %source, "Failed to decode record");
            PipelineError::Decode {
                sequence_number: id.clone(),
                source,
            }
        })?;

        let normalized = normalize(&text).map_err(|source| {
            tracing::error!(record = %id, error = %source, "Failed to normalize record");
            PipelineError::Normalize {
                sequence_number: id.clone(),
                source,
            }
        })?;

        for reason in &normalized.skipped {
            tracing::debug!(record = %id, reason = %reason, "Skipped payload content");
        }
        outcome.skipped.extend(normalized.skipped);

        for entry in normalized.entries {
            classifier.classify(entry, &mut outcome.buckets);
        }
    }

    outcome.stats = classifier.stats();
    tracing::info!(
        records = outcome.records,
        user_records = outcome.user_records,
        count = outcome.stats.processed,
        skipped = outcome.skipped.len(),
        buckets = outcome.buckets.len(),
        "Processed {} records",
        outcome.stats.processed
    );

    Ok(outcome)
}
