// AWS Lambda runtime adapter
//
// Kinesis event in, one object per log type out. The handler either writes
// every bucket or returns an error so the batch is retried as a whole.
//
// lambda_runtime drives a tokio runtime; state is built once per container
// and shared with every invocation.

use anyhow::Result;
use kinesis2s3_config::RuntimeConfig;
use kinesis2s3_core::{decode_and_classify, BatchOutcome, Classifier, FieldNames, RawRecord};
use kinesis2s3_writer::{upload_buckets, BlobStore, UploadReport};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::Instrument;

mod event;
mod init;

pub use event::KinesisEvent;
pub use init::{init_state, init_tracing};

/// Everything an invocation needs, built once per container
#[derive(Clone)]
pub struct HandlerState {
    pub store: Arc<dyn BlobStore>,
    pub fields: FieldNames,
    pub prefix: String,
}

impl HandlerState {
    pub fn new(store: Arc<dyn BlobStore>, fields: FieldNames, prefix: impl Into<String>) -> Self {
        Self {
            store,
            fields,
            prefix: prefix.into(),
        }
    }
}

/// What one invocation did
#[derive(Debug)]
pub struct InvocationSummary {
    pub outcome: BatchOutcome,
    pub report: UploadReport,
}

/// Run the decode and upload phases over one batch of records.
pub async fn process_records(
    state: &HandlerState,
    records: &[RawRecord],
) -> Result<InvocationSummary> {
    let outcome = {
        let _span = tracing::info_span!("decode", records = records.len()).entered();
        let mut classifier = Classifier::new(state.fields.clone());
        decode_and_classify(records, &mut classifier)?
    };

    let report = upload_buckets(state.store.as_ref(), &outcome.buckets, &state.prefix)
        .instrument(tracing::info_span!("upload", buckets = outcome.buckets.len()))
        .await?;

    Ok(InvocationSummary { outcome, report })
}

/// Lambda handler for Kinesis stream events
pub async fn handle_event(
    event: LambdaEvent<KinesisEvent>,
    state: Arc<HandlerState>,
) -> Result<(), Error> {
    let (event, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    async move {
        match process_records(&state, &event.records).await {
            Ok(summary) => {
                tracing::info!(
                    records = summary.outcome.records,
                    objects = summary.report.objects.len(),
                    "Batch shipped"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Batch failed, it will be retried");
                Err(Error::from(err))
            }
        }
    }
    .instrument(span)
    .await
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load()
        .map_err(|e| Error::from(format!("Failed to load configuration: {:#}", e)))?;
    init_tracing(&config.logging);

    let state = Arc::new(init_state(&config)?);
    tracing::info!(
        prefix = %state.prefix,
        type_field = %state.fields.type_field,
        "Lambda runtime ready"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<KinesisEvent>| {
        let state = state.clone();
        async move { handle_event(event, state).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use kinesis2s3_writer::OpendalStore;

    fn record(seq: usize, payload: &str) -> RawRecord {
        RawRecord::new(STANDARD.encode(payload), "pk", seq.to_string())
    }

    #[tokio::test]
    async fn test_process_records_writes_buckets() {
        let store = OpendalStore::memory().unwrap();
        let state = HandlerState::new(Arc::new(store.clone()), FieldNames::default(), "logs");

        let records = vec![
            record(1, r#"{"log_type":"app","id":"a","timestamp":"2024-01-02T03:04:05Z"}"#),
            record(2, r#"{"log_type":"web","id":"b","timestamp":"2024-01-02T03:04:05Z"}"#),
            record(3, "not json at all"),
        ];

        let summary = process_records(&state, &records).await.unwrap();
        assert_eq!(summary.report.objects.len(), 2);
        assert_eq!(summary.outcome.skipped.len(), 1);
        assert!(store
            .operator()
            .exists("logs/app/2024-01/02/2024-01-02-03:04:05-a.gz")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_fatal_record_writes_nothing() {
        let store = OpendalStore::memory().unwrap();
        let state = HandlerState::new(Arc::new(store.clone()), FieldNames::default(), "logs");

        let records = vec![
            record(1, r#"{"log_type":"app","id":"a","timestamp":"2024-01-02T03:04:05Z"}"#),
            record(2, r#"{"messageType":"SUBSCRIPTION_TEST"}"#),
        ];

        let err = process_records(&state, &records).await.unwrap_err();
        assert!(err.to_string().contains("record 2"));
        assert!(!store
            .operator()
            .exists("logs/app/2024-01/02/2024-01-02-03:04:05-a.gz")
            .await
            .unwrap());
    }
}
