//! Access to the SQS records of a Lambda event payload.

use serde_json::Value;

use crate::errors::ReportError;

/// The `Records` array of an SQS event.
///
/// # Errors
///
/// Returns a parse error when the payload has no `Records` array.
pub fn sqs_records(payload: &Value) -> Result<&[Value], ReportError> {
    payload
        .get("Records")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ReportError::ParseError("event has no SQS Records".to_string()))
}

/// The raw `body` string of one SQS record.
///
/// # Errors
///
/// Returns a parse error when the record has no string body.
pub fn record_body(record: &Value) -> Result<&str, ReportError> {
    record
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| ReportError::ParseError("SQS record has no body".to_string()))
}

#[must_use]
pub fn message_id(record: &Value) -> Option<&str> {
    record.get("messageId").and_then(Value::as_str)
}
