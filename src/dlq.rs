//! Dead-letter queue Lambda: every report that lands here is marked `FAILED`
//! unless it already finished.

use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::ReportError;
use crate::events::{message_id, record_body, sqs_records};
use crate::storage::ReportStore;

pub const FAILED_MESSAGE: &str =
    "Marked Report as Failed to process and informed concerned stakeholders";

#[derive(Debug, Default, Serialize)]
pub struct DlqResponse {
    pub processed_messages: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReportKey {
    pub report_id: i64,
    pub batch_no: i64,
}

/// Reads the report key from a DLQ message body. The worker forwards whole
/// SQS records, whose own `body` holds the report; SQS redrive delivers the
/// report message itself.
///
/// # Errors
///
/// Returns a parse error if neither shape carries a report key.
pub fn parse_report_key(body: &str) -> Result<ReportKey, ReportError> {
    let outer: Value = serde_json::from_str(body)?;
    let inner = match outer.get("body") {
        Some(Value::String(wrapped)) => serde_json::from_str(wrapped)?,
        Some(wrapped) => wrapped.clone(),
        None => outer,
    };
    Ok(serde_json::from_value(inner)?)
}

/// Marks every report in the batch failed. Bad records are logged and skipped.
pub async fn process_event(store: &dyn ReportStore, payload: &Value) -> DlqResponse {
    let records = match sqs_records(payload) {
        Ok(records) => records,
        Err(e) => {
            error!("[dlq] {}", e);
            return DlqResponse::default();
        }
    };
    let total = records.len();
    info!("[dlq] Received {} record(s)", total);

    let mut response = DlqResponse::default();
    for (idx, record) in records.iter().enumerate() {
        let result = async {
            let key = parse_report_key(record_body(record)?)?;
            let prefix = format!(
                "[dlq {}/{} report={} batch={}]",
                idx + 1,
                total,
                key.report_id,
                key.batch_no
            );
            info!("{} Marking as FAILED", prefix);
            if store
                .fail_report(key.report_id, key.batch_no, FAILED_MESSAGE)
                .await?
            {
                info!("{} Done", prefix);
            } else {
                warn!("{} Already FINISHED, left untouched", prefix);
            }
            Ok::<_, ReportError>(())
        }
        .await;

        match result {
            Ok(()) => response.processed_messages += 1,
            Err(e) => error!(
                "[dlq {}/{}] Error processing DLQ message {}: {}",
                idx + 1,
                total,
                message_id(record).unwrap_or("<unknown>"),
                e
            ),
        }
    }

    info!(
        "[dlq] Processed {}/{} messages",
        response.processed_messages, total
    );
    response
}

/// Lambda handler for the DLQ consumer.
///
/// # Errors
///
/// Only fails if the response cannot be serialized.
pub async fn handler(store: &dyn ReportStore, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let response = process_event(store, &event.payload).await;
    Ok(serde_json::to_value(response)?)
}
