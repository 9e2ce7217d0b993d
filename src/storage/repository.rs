//! Report status table.
//!
//! Rows are keyed by `(report_id, batch_no)`; the `batch_no-index` GSI lists
//! every report of one producer run.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, ReturnValuesOnConditionCheckFailure};
use chrono::Utc;
use tracing::info;

use super::dynamo::{
    Item, get_number, get_optional_string, get_string, num, optional_string, parse_number, string,
};
use crate::core::models::{Portfolio, Report, Status};
use crate::errors::ReportError;

pub const BATCH_INDEX: &str = "batch_no-index";

/// Fields written by a status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: Status,
    pub s3_key: Option<String>,
    pub error_msg: Option<String>,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            s3_key: None,
            error_msg: None,
        }
    }

    #[must_use]
    pub fn with_s3_key(mut self, s3_key: impl Into<String>) -> Self {
        self.s3_key = Some(s3_key.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error_msg: impl Into<String>) -> Self {
        self.error_msg = Some(error_msg.into());
        self
    }
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Writes the report only if no row with its key exists yet. Returns
    /// `false` for a duplicate, in which case nothing was written.
    async fn create_report(&self, report: &Report) -> Result<bool, ReportError>;

    /// Atomically moves a report from `QUEUED` (or a `CREATED` report whose
    /// producer never recorded the enqueue) to `IN_PROGRESS`. Returns `false`
    /// when the report is in any other state, which means another delivery
    /// of the same message already claimed it.
    async fn claim_report(&self, report_id: i64, batch_no: i64) -> Result<bool, ReportError>;

    async fn get_report(&self, report_id: i64, batch_no: i64)
    -> Result<Option<Report>, ReportError>;

    async fn get_reports_by_batch(&self, batch_no: i64) -> Result<Vec<Report>, ReportError>;

    /// Applies the update and returns the report as stored afterwards.
    async fn update_report_status(
        &self,
        report_id: i64,
        batch_no: i64,
        update: StatusUpdate,
    ) -> Result<Report, ReportError>;

    /// Marks the report `FAILED` with `error_msg` unless it already
    /// `FINISHED`. Returns `false` for a finished report, which is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Fails when the report does not exist.
    async fn fail_report(
        &self,
        report_id: i64,
        batch_no: i64,
        error_msg: &str,
    ) -> Result<bool, ReportError>;

    async fn delete_report(&self, report_id: i64, batch_no: i64) -> Result<(), ReportError>;
}

fn not_found(report_id: i64, batch_no: i64) -> ReportError {
    ReportError::AwsError(format!("report {report_id} of batch {batch_no} not found"))
}

pub struct DynamoReportStore {
    client: DynamoClient,
    table: String,
}

impl DynamoReportStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

fn key(report_id: i64, batch_no: i64) -> Item {
    HashMap::from([
        ("report_id".to_string(), num(report_id)),
        ("batch_no".to_string(), num(batch_no)),
    ])
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[must_use]
pub fn report_to_item(report: &Report, now: &str) -> Item {
    let payload: Item = report
        .payload
        .iter()
        .map(|(ticker, shares)| (ticker.clone(), num(shares)))
        .collect();

    let mut item = key(report.report_id, report.batch_no);
    item.insert("status".to_string(), string(report.status.as_str()));
    item.insert(
        "s3_key".to_string(),
        optional_string(report.s3_key.as_deref()),
    );
    item.insert("payload".to_string(), AttributeValue::M(payload));
    if let Some(error_msg) = &report.error_msg {
        item.insert("error_msg".to_string(), string(error_msg.as_str()));
    }
    item.insert("created_at".to_string(), string(now));
    item.insert("updated_at".to_string(), string(now));
    item
}

/// # Errors
///
/// Returns a parse error if a required attribute is missing or malformed.
pub fn item_to_report(item: &Item) -> Result<Report, ReportError> {
    let mut payload = Portfolio::new();
    if let Some(map) = item.get("payload").and_then(|v| v.as_m().ok()) {
        for (ticker, shares) in map {
            let raw = shares.as_n().map_err(|_| {
                ReportError::ParseError(format!("payload share count for {ticker} is not a number"))
            })?;
            payload.insert(ticker.clone(), parse_number(raw, ticker)?);
        }
    }

    Ok(Report {
        report_id: get_number(item, "report_id")?,
        batch_no: get_number(item, "batch_no")?,
        status: get_string(item, "status")?.parse()?,
        s3_key: get_optional_string(item, "s3_key"),
        payload,
        error_msg: get_optional_string(item, "error_msg"),
    })
}

#[async_trait]
impl ReportStore for DynamoReportStore {
    async fn create_report(&self, report: &Report) -> Result<bool, ReportError> {
        let item = report_to_item(report, &timestamp());
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .condition_expression(
                "attribute_not_exists(report_id) AND attribute_not_exists(batch_no)",
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                info!(
                    "Report {} of batch {} already exists",
                    report.report_id, report.batch_no
                );
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn claim_report(&self, report_id: i64, batch_no: i64) -> Result<bool, ReportError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(key(report_id, batch_no)))
            .update_expression("SET #status = :in_progress, updated_at = :ts")
            .condition_expression("#status IN (:created, :queued)")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":in_progress", string(Status::InProgress.as_str()))
            .expression_attribute_values(":created", string(Status::Created.as_str()))
            .expression_attribute_values(":queued", string(Status::Queued.as_str()))
            .expression_attribute_values(":ts", string(timestamp()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_report(
        &self,
        report_id: i64,
        batch_no: i64,
    ) -> Result<Option<Report>, ReportError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(key(report_id, batch_no)))
            .send()
            .await?;

        output.item().map(item_to_report).transpose()
    }

    async fn get_reports_by_batch(&self, batch_no: i64) -> Result<Vec<Report>, ReportError> {
        let mut reports = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(BATCH_INDEX)
                .key_condition_expression("batch_no = :batch_no")
                .expression_attribute_values(":batch_no", num(batch_no))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await?;

            for item in output.items() {
                reports.push(item_to_report(item)?);
            }

            match output.last_evaluated_key() {
                Some(last) if !last.is_empty() => start_key = Some(last.clone()),
                _ => break,
            }
        }

        Ok(reports)
    }

    async fn update_report_status(
        &self,
        report_id: i64,
        batch_no: i64,
        update: StatusUpdate,
    ) -> Result<Report, ReportError> {
        let mut expression = String::from("SET #status = :status, updated_at = :updated_at");
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(key(report_id, batch_no)))
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", string(update.status.as_str()))
            .expression_attribute_values(":updated_at", string(timestamp()))
            .return_values(ReturnValue::AllNew);

        if let Some(s3_key) = update.s3_key {
            expression.push_str(", s3_key = :s3_key");
            request = request.expression_attribute_values(":s3_key", string(s3_key));
        }
        if let Some(error_msg) = update.error_msg {
            expression.push_str(", error_msg = :error_msg");
            request = request.expression_attribute_values(":error_msg", string(error_msg));
        }

        let output = request.update_expression(expression).send().await?;
        let attributes = output.attributes().ok_or_else(|| {
            ReportError::AwsError(format!(
                "update of report {report_id} in batch {batch_no} returned no attributes"
            ))
        })?;
        item_to_report(attributes)
    }

    async fn fail_report(
        &self,
        report_id: i64,
        batch_no: i64,
        error_msg: &str,
    ) -> Result<bool, ReportError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .set_key(Some(key(report_id, batch_no)))
            .update_expression("SET #status = :failed, error_msg = :error_msg, updated_at = :ts")
            .condition_expression("attribute_exists(report_id) AND #status <> :finished")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":failed", string(Status::Failed.as_str()))
            .expression_attribute_values(":finished", string(Status::Finished.as_str()))
            .expression_attribute_values(":error_msg", string(error_msg))
            .expression_attribute_values(":ts", string(timestamp()))
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                // The old item comes back only when the row exists, so a
                // failed check without it means the report is missing.
                let row_exists = match e.as_service_error() {
                    Some(UpdateItemError::ConditionalCheckFailedException(failed)) => {
                        Some(failed.item().is_some())
                    }
                    _ => None,
                };
                match row_exists {
                    Some(true) => Ok(false),
                    Some(false) => Err(not_found(report_id, batch_no)),
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn delete_report(&self, report_id: i64, batch_no: i64) -> Result<(), ReportError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(key(report_id, batch_no)))
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_item_conversion_preserves_fields() {
        let mut payload = Portfolio::new();
        payload.insert("AAPL".to_string(), 9.0);
        payload.insert("SPY".to_string(), 20.0);
        let mut report = Report::new(3, 20_240_105_101_500, payload);
        report.status = Status::Rejected;
        report.error_msg = Some("no data".to_string());

        let item = report_to_item(&report, "2024-01-05T10:15:00Z");
        assert_eq!(item.get("s3_key"), Some(&AttributeValue::Null(true)));
        assert_eq!(item_to_report(&item).unwrap(), report);
    }

    #[test]
    fn status_update_builder() {
        let update = StatusUpdate::new(Status::Finished).with_s3_key("reports/x.pdf");
        assert_eq!(update.s3_key.as_deref(), Some("reports/x.pdf"));
        assert!(update.error_msg.is_none());
    }
}
