//! In-memory stand-ins for the AWS and Yahoo collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use portfolio_reports::core::config::AppConfig;
use portfolio_reports::core::models::{
    CachedMarketData, Portfolio, PriceBar, PriceHistory, Report, Status,
};
use portfolio_reports::errors::ReportError;
use portfolio_reports::market::{MarketCache, QuoteSource};
use portfolio_reports::services::Services;
use portfolio_reports::storage::{QueueSender, ReportSink, ReportStore, StatusUpdate};
use serde_json::{Value, json};

pub const BUCKET: &str = "reports-bucket";
pub const QUEUE_URL: &str = "https://sqs.test/reports";
pub const DLQ_URL: &str = "https://sqs.test/reports-dlq";

/// Daily bars starting 2024-01-01 with the given closes.
pub fn history(closes: &[f64]) -> PriceHistory {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceHistory::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: *close,
                high: close * 1.01,
                low: close * 0.99,
                close: *close,
                volume: 1_000,
            })
            .collect(),
    )
}

/// A gently rising series of `len` closes.
pub fn rising(start: f64, len: usize) -> PriceHistory {
    let closes: Vec<f64> = (0..len).map(|i| start + i as f64 * 0.5).collect();
    history(&closes)
}

pub fn portfolio(holdings: &[(&str, f64)]) -> Portfolio {
    holdings
        .iter()
        .map(|(ticker, shares)| ((*ticker).to_string(), *shares))
        .collect()
}

pub fn sqs_event(reports: &[&Report]) -> Value {
    let records: Vec<Value> = reports
        .iter()
        .enumerate()
        .map(|(i, report)| {
            json!({
                "messageId": format!("msg-{i}"),
                "body": serde_json::to_string(report).unwrap(),
            })
        })
        .collect();
    json!({ "Records": records })
}

#[derive(Default)]
pub struct MemoryReportStore {
    pub rows: Mutex<HashMap<(i64, i64), Report>>,
    pub transitions: Mutex<Vec<(i64, Status)>>,
    /// The next update to this status fails once without writing.
    pub fail_next: Mutex<Option<Status>>,
}

impl MemoryReportStore {
    pub fn fail_next_update_to(&self, status: Status) {
        *self.fail_next.lock().unwrap() = Some(status);
    }

    pub fn insert(&self, report: Report) {
        self.rows
            .lock()
            .unwrap()
            .insert((report.report_id, report.batch_no), report);
    }

    pub fn row(&self, report_id: i64, batch_no: i64) -> Option<Report> {
        self.rows.lock().unwrap().get(&(report_id, batch_no)).cloned()
    }

    pub fn statuses_of(&self, report_id: i64) -> Vec<Status> {
        self.transitions
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == report_id)
            .map(|(_, status)| *status)
            .collect()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create_report(&self, report: &Report) -> Result<bool, ReportError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (report.report_id, report.batch_no);
        if rows.contains_key(&key) {
            return Ok(false);
        }
        rows.insert(key, report.clone());
        Ok(true)
    }

    async fn claim_report(&self, report_id: i64, batch_no: i64) -> Result<bool, ReportError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&(report_id, batch_no)) {
            Some(row) if matches!(row.status, Status::Created | Status::Queued) => {
                row.status = Status::InProgress;
                self.transitions
                    .lock()
                    .unwrap()
                    .push((report_id, Status::InProgress));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_report(
        &self,
        report_id: i64,
        batch_no: i64,
    ) -> Result<Option<Report>, ReportError> {
        Ok(self.row(report_id, batch_no))
    }

    async fn get_reports_by_batch(&self, batch_no: i64) -> Result<Vec<Report>, ReportError> {
        let mut reports: Vec<Report> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.batch_no == batch_no)
            .cloned()
            .collect();
        reports.sort_by_key(|r| r.report_id);
        Ok(reports)
    }

    async fn update_report_status(
        &self,
        report_id: i64,
        batch_no: i64,
        update: StatusUpdate,
    ) -> Result<Report, ReportError> {
        {
            let mut fail_next = self.fail_next.lock().unwrap();
            if *fail_next == Some(update.status) {
                *fail_next = None;
                return Err(ReportError::AwsError(format!(
                    "update of report {report_id} to {} throttled",
                    update.status
                )));
            }
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&(report_id, batch_no)).ok_or_else(|| {
            ReportError::AwsError(format!("report {report_id} of batch {batch_no} not found"))
        })?;
        row.status = update.status;
        if let Some(s3_key) = update.s3_key {
            row.s3_key = Some(s3_key);
        }
        if let Some(error_msg) = update.error_msg {
            row.error_msg = Some(error_msg);
        }
        self.transitions
            .lock()
            .unwrap()
            .push((report_id, update.status));
        Ok(row.clone())
    }

    async fn fail_report(
        &self,
        report_id: i64,
        batch_no: i64,
        error_msg: &str,
    ) -> Result<bool, ReportError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&(report_id, batch_no)).ok_or_else(|| {
            ReportError::AwsError(format!("report {report_id} of batch {batch_no} not found"))
        })?;
        if row.status == Status::Finished {
            return Ok(false);
        }
        row.status = Status::Failed;
        row.error_msg = Some(error_msg.to_string());
        self.transitions
            .lock()
            .unwrap()
            .push((report_id, Status::Failed));
        Ok(true)
    }

    async fn delete_report(&self, report_id: i64, batch_no: i64) -> Result<(), ReportError> {
        self.rows.lock().unwrap().remove(&(report_id, batch_no));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMarketCache {
    pub rows: Mutex<HashMap<String, CachedMarketData>>,
    pub invalidated: Mutex<Vec<String>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryMarketCache {
    pub fn with_history(self, ticker: &str, history: PriceHistory) -> Self {
        self.rows.lock().unwrap().insert(
            ticker.to_string(),
            CachedMarketData {
                ticker: ticker.to_string(),
                period: "2mo".to_string(),
                history,
                updated_at: None,
                is_valid: true,
            },
        );
        self
    }

    pub fn with_invalid(self, ticker: &str) -> Self {
        self.rows.lock().unwrap().insert(
            ticker.to_string(),
            CachedMarketData {
                ticker: ticker.to_string(),
                period: "2mo".to_string(),
                history: PriceHistory::default(),
                updated_at: None,
                is_valid: false,
            },
        );
        self
    }

    pub fn cached(&self, ticker: &str) -> Option<CachedMarketData> {
        self.rows.lock().unwrap().get(ticker).cloned()
    }

    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketCache for MemoryMarketCache {
    async fn get_market_data(
        &self,
        ticker: &str,
    ) -> Result<Option<CachedMarketData>, ReportError> {
        if self.fail_reads {
            return Err(ReportError::AwsError("cache unavailable".to_string()));
        }
        Ok(self.cached(ticker))
    }

    async fn store_ticker_data(
        &self,
        ticker: &str,
        history: &PriceHistory,
        period: &str,
    ) -> Result<(), ReportError> {
        if self.fail_writes {
            return Err(ReportError::AwsError("cache table throttled".to_string()));
        }
        self.rows.lock().unwrap().insert(
            ticker.to_string(),
            CachedMarketData {
                ticker: ticker.to_string(),
                period: period.to_string(),
                history: history.clone(),
                updated_at: Some("2024-01-01T00:00:00Z".to_string()),
                is_valid: true,
            },
        );
        Ok(())
    }

    async fn mark_ticker_as_invalid(&self, ticker: &str) -> Result<(), ReportError> {
        self.invalidated.lock().unwrap().push(ticker.to_string());
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(ticker.to_string())
            .or_insert_with(|| CachedMarketData {
                ticker: ticker.to_string(),
                period: String::new(),
                history: PriceHistory::default(),
                updated_at: None,
                is_valid: false,
            });
        row.is_valid = false;
        Ok(())
    }
}

/// What the stub API answers for one ticker.
#[derive(Clone)]
pub enum Quote {
    Data(PriceHistory),
    Empty,
    Unknown,
    Down,
}

#[derive(Default)]
pub struct StubQuotes {
    pub quotes: HashMap<String, Quote>,
    pub calls: Mutex<Vec<String>>,
}

impl StubQuotes {
    pub fn with(mut self, ticker: &str, quote: Quote) -> Self {
        self.quotes.insert(ticker.to_string(), quote);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSource for StubQuotes {
    async fn history(&self, ticker: &str, _period: &str) -> Result<PriceHistory, ReportError> {
        self.calls.lock().unwrap().push(ticker.to_string());
        match self.quotes.get(ticker) {
            Some(Quote::Data(history)) => Ok(history.clone()),
            Some(Quote::Empty) => Ok(PriceHistory::default()),
            Some(Quote::Down) => Err(ReportError::HttpError("connection reset".to_string())),
            Some(Quote::Unknown) | None => Err(ReportError::TickerNotFound(format!(
                "No data found, symbol may be delisted: {ticker}"
            ))),
        }
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail: bool,
}

impl MemorySink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn put_pdf(&self, key: &str, pdf: Vec<u8>) -> Result<(), ReportError> {
        if self.fail {
            return Err(ReportError::AwsError("S3 unavailable".to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), pdf);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingQueue {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingQueue {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent_to(&self, queue_url: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url == queue_url)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl QueueSender for RecordingQueue {
    async fn send(&self, queue_url: &str, body: String) -> Result<(), ReportError> {
        if self.fail {
            return Err(ReportError::AwsError("SQS unavailable".to_string()));
        }
        self.sent.lock().unwrap().push((queue_url.to_string(), body));
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        s3_bucket_name: Some(BUCKET.to_string()),
        sqs_queue_url: Some(QUEUE_URL.to_string()),
        dlq_queue_url: Some(DLQ_URL.to_string()),
        ..AppConfig::default()
    }
}

/// Handles on the fakes behind a `Services`, kept for assertions.
pub struct Harness {
    pub services: Services,
    pub reports: Arc<MemoryReportStore>,
    pub market: Arc<MemoryMarketCache>,
    pub quotes: Arc<StubQuotes>,
    pub sink: Arc<MemorySink>,
    pub queue: Arc<RecordingQueue>,
}

impl Harness {
    pub fn new(market: MemoryMarketCache, quotes: StubQuotes) -> Self {
        Self::with_parts(test_config(), market, quotes, MemorySink::default())
    }

    pub fn with_parts(
        config: AppConfig,
        market: MemoryMarketCache,
        quotes: StubQuotes,
        sink: MemorySink,
    ) -> Self {
        let reports = Arc::new(MemoryReportStore::default());
        let market = Arc::new(market);
        let quotes = Arc::new(quotes);
        let sink = Arc::new(sink);
        let queue = Arc::new(RecordingQueue::default());
        let services = Services {
            config,
            reports: reports.clone(),
            market: market.clone(),
            quotes: quotes.clone(),
            sink: sink.clone(),
            queue: queue.clone(),
        };
        Self {
            services,
            reports,
            market,
            quotes,
            sink,
            queue,
        }
    }
}
