#![allow(clippy::missing_errors_doc)]
use chrono::Utc;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::generate::{collect_data_and_generate_report, report_key};
use crate::core::models::{Report, Status};
use crate::errors::ReportError;
use crate::events::{record_body, sqs_records};
use crate::services::Services;
use crate::storage::StatusUpdate;

#[derive(Debug, Default, Serialize)]
pub struct WorkerResponse {
    pub processed_messages: usize,
    pub reports: Vec<Report>,
}

/// What happened to one SQS record.
enum Outcome {
    Finished(Report),
    Rejected(Report),
    Duplicate,
}

async fn generate_and_upload(
    services: &Services,
    report: &Report,
    prefix: &str,
) -> Result<String, ReportError> {
    let config = &services.config;
    let pdf = collect_data_and_generate_report(
        services.market.as_ref(),
        services.quotes.as_ref(),
        &report.payload,
        &config.market_data_period,
        &config.benchmark_ticker,
        prefix,
    )
    .await?;

    services
        .reports
        .update_report_status(
            report.report_id,
            report.batch_no,
            StatusUpdate::new(Status::UploadStarted),
        )
        .await?;
    let s3_key = report_key(report.batch_no, report.report_id, Utc::now());
    info!(
        "{} Status: UPLOAD_STARTED -> s3://{}/{}",
        prefix,
        config.s3_bucket_name.as_deref().unwrap_or_default(),
        s3_key
    );

    services.sink.put_pdf(&s3_key, pdf).await?;
    Ok(s3_key)
}

async fn send_to_dlq(services: &Services, record: &Value, report: &Report) {
    info!(
        "Sending Error message to DLQ for {} from {}",
        report.report_id, report.batch_no
    );
    let result = match services.config.require_dlq_url() {
        Ok(url) => services.queue.send(url, record.to_string()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        error!(
            "Fail to send error message to DLQ for {} from {}: {}",
            report.report_id, report.batch_no, e
        );
    }
}

async fn process_record(
    services: &Services,
    record: &Value,
    position: usize,
    total: usize,
) -> Result<Outcome, ReportError> {
    let mut report: Report = serde_json::from_str(record_body(record)?)?;
    report.status = Status::Queued;
    let prefix = format!(
        "[batch={} report={} ({}/{})]",
        report.batch_no, report.report_id, position, total
    );

    if !services
        .reports
        .claim_report(report.report_id, report.batch_no)
        .await?
    {
        warn!("{} Already claimed, skipping duplicate delivery", prefix);
        return Ok(Outcome::Duplicate);
    }
    report.status = Status::InProgress;
    info!("{} Status: IN_PROGRESS", prefix);

    match complete_claimed(services, record, report.clone(), &prefix).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            error!(
                "Retrying Message for {} from {}: {}",
                report.report_id, report.batch_no, e
            );
            // Every failure after the claim hands the report back so the
            // redelivered message can claim it again.
            if let Err(reset_err) = services
                .reports
                .update_report_status(
                    report.report_id,
                    report.batch_no,
                    StatusUpdate::new(Status::Queued),
                )
                .await
            {
                error!("{} Failed to return report to QUEUED: {}", prefix, reset_err);
            }
            Err(e)
        }
    }
}

/// Generates a claimed report and records its terminal status. Only
/// rejections end here successfully; any other error, including a failed
/// status write, is returned for the caller to retry.
async fn complete_claimed(
    services: &Services,
    record: &Value,
    mut report: Report,
    prefix: &str,
) -> Result<Outcome, ReportError> {
    match generate_and_upload(services, &report, prefix).await {
        Ok(s3_key) => {
            services
                .reports
                .update_report_status(
                    report.report_id,
                    report.batch_no,
                    StatusUpdate::new(Status::Finished).with_s3_key(s3_key.clone()),
                )
                .await?;
            report.s3_key = Some(s3_key);
            report.status = Status::Finished;
            info!("{} Status: FINISHED", prefix);
            Ok(Outcome::Finished(report))
        }
        Err(e) if e.is_rejection() => {
            let error_msg = e.to_string();
            services
                .reports
                .update_report_status(
                    report.report_id,
                    report.batch_no,
                    StatusUpdate::new(Status::Rejected).with_error(error_msg.clone()),
                )
                .await?;
            info!("{} Status: REJECTED - {}", prefix, error_msg);
            report.status = Status::Rejected;
            report.error_msg = Some(error_msg);
            send_to_dlq(services, record, &report).await;
            Ok(Outcome::Rejected(report))
        }
        Err(e) => Err(e),
    }
}

/// Processes every record of an SQS batch in order. Rejected reports are
/// dead-lettered; any other failure aborts the batch so SQS redelivers it.
pub async fn process_event(
    services: &Services,
    payload: &Value,
) -> Result<WorkerResponse, ReportError> {
    services.config.require_bucket()?;
    let records = sqs_records(payload)?;
    let total = records.len();
    info!("[lambda] Received {} record(s)", total);

    let mut response = WorkerResponse::default();
    for (idx, record) in records.iter().enumerate() {
        match process_record(services, record, idx + 1, total).await? {
            Outcome::Finished(report) => {
                response.processed_messages += 1;
                response.reports.push(report);
            }
            Outcome::Rejected(report) => response.reports.push(report),
            Outcome::Duplicate => {}
        }
    }
    Ok(response)
}

/// Lambda handler for the report worker.
pub async fn function_handler(
    services: &Services,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let response = process_event(services, &event.payload)
        .await
        .map_err(|e| {
            error!("Report batch failed: {}", e);
            Error::from(e)
        })?;
    Ok(serde_json::to_value(response)?)
}

pub use self::function_handler as handler;
