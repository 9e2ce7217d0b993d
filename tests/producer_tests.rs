mod common;

use common::*;
use portfolio_reports::core::models::{Report, Status};
use portfolio_reports::producer::{
    SEND_FAILURE_MESSAGE, SubmitOutcome, produce_batch, submit_report,
};
use portfolio_reports::storage::ReportStore;
use rand::SeedableRng;
use rand::rngs::StdRng;

const BATCH: i64 = 20_240_301_120_000;

#[tokio::test]
async fn test_submitted_report_is_queued() {
    let store = MemoryReportStore::default();
    let queue = RecordingQueue::default();
    let report = Report::new(0, BATCH, portfolio(&[("AAPL", 9.0), ("SPY", 20.0)]));

    let outcome = submit_report(&store, &queue, QUEUE_URL, &report)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Queued);
    assert_eq!(store.row(0, BATCH).unwrap().status, Status::Queued);
    let sent = queue.sent_to(QUEUE_URL);
    assert_eq!(sent.len(), 1);
    let body: Report = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(body.payload, report.payload);
}

#[tokio::test]
async fn test_send_failure_marks_report_failed() {
    let store = MemoryReportStore::default();
    let queue = RecordingQueue::failing();
    let report = Report::new(1, BATCH, portfolio(&[("AAPL", 9.0)]));

    let outcome = submit_report(&store, &queue, QUEUE_URL, &report)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::SendFailed);
    let row = store.row(1, BATCH).unwrap();
    assert_eq!(row.status, Status::Failed);
    assert_eq!(row.error_msg.as_deref(), Some(SEND_FAILURE_MESSAGE));
}

#[tokio::test]
async fn test_existing_report_is_not_resent() {
    let store = MemoryReportStore::default();
    let queue = RecordingQueue::default();
    let report = Report::new(2, BATCH, portfolio(&[("AAPL", 9.0)]));
    store.insert(report.clone());

    let outcome = submit_report(&store, &queue, QUEUE_URL, &report)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Duplicate);
    assert!(queue.sent_to(QUEUE_URL).is_empty());
}

#[tokio::test]
async fn test_batch_creates_sequential_reports_with_benchmark() {
    let store = MemoryReportStore::default();
    let queue = RecordingQueue::default();
    let mut rng = StdRng::seed_from_u64(42);

    let summary = produce_batch(&store, &queue, QUEUE_URL, BATCH, 5, "SPY", &mut rng)
        .await
        .unwrap();

    assert_eq!(summary.batch_no, BATCH);
    assert_eq!(summary.queued, 5);
    assert_eq!(summary.failed, 0);

    let reports = store.get_reports_by_batch(BATCH).await.unwrap();
    let ids: Vec<i64> = reports.iter().map(|r| r.report_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    for report in &reports {
        assert_eq!(report.status, Status::Queued);
        assert_eq!(report.payload.len(), 6);
        assert!(report.payload.contains_key("SPY"));
    }
}

#[tokio::test]
async fn test_rerun_of_a_batch_only_counts_duplicates() {
    let store = MemoryReportStore::default();
    let queue = RecordingQueue::default();
    let mut rng = StdRng::seed_from_u64(1);

    produce_batch(&store, &queue, QUEUE_URL, BATCH, 3, "SPY", &mut rng)
        .await
        .unwrap();
    let rerun = produce_batch(&store, &queue, QUEUE_URL, BATCH, 3, "SPY", &mut rng)
        .await
        .unwrap();

    assert_eq!(rerun.queued, 0);
    assert_eq!(rerun.duplicates, 3);
    assert_eq!(queue.sent_to(QUEUE_URL).len(), 3);
}
