//! Batch producer: creates report rows and enqueues them for the worker.

use chrono::{DateTime, Local};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::models::{Portfolio, Report, Status};
use crate::core::universe::UNIVERSE;
use crate::errors::ReportError;
use crate::storage::{QueueSender, ReportStore, StatusUpdate};

pub const DEFAULT_REPORT_COUNT: usize = 100;
pub const DEFAULT_HOLDINGS: usize = 5;
pub const SEND_FAILURE_MESSAGE: &str = "Failed to Send Message to Queue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    SendFailed,
    Duplicate,
}

#[derive(Debug, Default, Serialize)]
pub struct ProduceSummary {
    pub batch_no: i64,
    pub queued: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Batch numbers are the producer's start time as `YYYYMMDDHHMMSS`.
#[must_use]
pub fn batch_number(at: DateTime<Local>) -> i64 {
    at.format("%Y%m%d%H%M%S")
        .to_string()
        .parse()
        .unwrap_or_default()
}

/// `n` distinct non-benchmark holdings plus the benchmark itself.
pub fn random_portfolio<R: Rng + ?Sized>(rng: &mut R, n: usize, benchmark: &str) -> Portfolio {
    let stocks: Vec<&(&str, u32)> = UNIVERSE
        .iter()
        .filter(|(ticker, _)| *ticker != benchmark)
        .collect();

    let mut portfolio: Portfolio = stocks
        .choose_multiple(rng, n.min(stocks.len()))
        .map(|(ticker, shares)| ((*ticker).to_string(), f64::from(*shares)))
        .collect();

    let benchmark_shares = UNIVERSE
        .iter()
        .find(|(ticker, _)| *ticker == benchmark)
        .map_or(1, |(_, shares)| *shares);
    portfolio.insert(benchmark.to_string(), f64::from(benchmark_shares));
    portfolio
}

/// Persists the report, then enqueues it. The row ends up `QUEUED` when the
/// send succeeds and `FAILED` when it does not.
///
/// # Errors
///
/// Returns an error only when the reports table itself cannot be written.
pub async fn submit_report(
    store: &dyn ReportStore,
    queue: &dyn QueueSender,
    queue_url: &str,
    report: &Report,
) -> Result<SubmitOutcome, ReportError> {
    if !store.create_report(report).await? {
        return Ok(SubmitOutcome::Duplicate);
    }
    info!("[DB] Created report {:?}", report);

    let body = serde_json::to_string(report)?;
    match queue.send(queue_url, body).await {
        Ok(()) => {
            store
                .update_report_status(
                    report.report_id,
                    report.batch_no,
                    StatusUpdate::new(Status::Queued),
                )
                .await?;
            info!("[SQS] Sent report {} to queue", report.report_id);
            Ok(SubmitOutcome::Queued)
        }
        Err(e) => {
            store
                .update_report_status(
                    report.report_id,
                    report.batch_no,
                    StatusUpdate::new(Status::Failed).with_error(SEND_FAILURE_MESSAGE),
                )
                .await?;
            error!("[SQS] Failed to send report {}: {}", report.report_id, e);
            Ok(SubmitOutcome::SendFailed)
        }
    }
}

/// Creates and enqueues `count` random reports under one batch number.
///
/// # Errors
///
/// Returns an error when the reports table cannot be written.
pub async fn produce_batch<R: Rng + ?Sized>(
    store: &dyn ReportStore,
    queue: &dyn QueueSender,
    queue_url: &str,
    batch_no: i64,
    count: usize,
    benchmark: &str,
    rng: &mut R,
) -> Result<ProduceSummary, ReportError> {
    let mut summary = ProduceSummary {
        batch_no,
        ..ProduceSummary::default()
    };

    for i in 0..count {
        let portfolio = random_portfolio(rng, DEFAULT_HOLDINGS, benchmark);
        let report_id = i64::try_from(i)
            .map_err(|_| ReportError::InvalidPayload(format!("report id {i} out of range")))?;
        let report = Report::new(report_id, batch_no, portfolio);

        match submit_report(store, queue, queue_url, &report).await? {
            SubmitOutcome::Queued => summary.queued += 1,
            SubmitOutcome::SendFailed => summary.failed += 1,
            SubmitOutcome::Duplicate => {
                warn!("[DB] Report {} already exists, skipped", report_id);
                summary.duplicates += 1;
            }
        }
    }

    info!(
        "Batch {}: {} queued, {} failed, {} duplicates",
        summary.batch_no, summary.queued, summary.failed, summary.duplicates
    );
    Ok(summary)
}
