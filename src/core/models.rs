use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ReportError;

/// Ticker symbol to number of shares held.
pub type Portfolio = BTreeMap<String, f64>;

/// Price history per ticker for one report run.
pub type MarketData = HashMap<String, PriceHistory>;

static TICKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,9}$").expect("static regex compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Created,
    Queued,
    InProgress,
    UploadStarted,
    Finished,
    Rejected,
    Failed,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Created => "CREATED",
            Status::Queued => "QUEUED",
            Status::InProgress => "IN_PROGRESS",
            Status::UploadStarted => "UPLOAD_STARTED",
            Status::Finished => "FINISHED",
            Status::Rejected => "REJECTED",
            Status::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Status::Created),
            "QUEUED" => Ok(Status::Queued),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "UPLOAD_STARTED" => Ok(Status::UploadStarted),
            "FINISHED" => Ok(Status::Finished),
            "REJECTED" => Ok(Status::Rejected),
            "FAILED" => Ok(Status::Failed),
            other => Err(ReportError::ParseError(format!("unknown status: {other}"))),
        }
    }
}

fn default_status() -> Status {
    Status::Created
}

/// A single report request and its processing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: i64,
    pub batch_no: i64,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default)]
    pub s3_key: Option<String>,
    pub payload: Portfolio,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl Report {
    #[must_use]
    pub fn new(report_id: i64, batch_no: i64, payload: Portfolio) -> Self {
        Self {
            report_id,
            batch_no,
            status: Status::Created,
            s3_key: None,
            payload,
            error_msg: None,
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Chronologically ordered daily bars for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    #[must_use]
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Close `n` bars from the end, where `1` is the latest bar.
    #[must_use]
    pub fn close_from_end(&self, n: usize) -> Option<f64> {
        if n == 0 || n > self.bars.len() {
            return None;
        }
        Some(self.bars[self.bars.len() - n].close)
    }
}

/// A row of the market data cache table.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMarketData {
    pub ticker: String,
    pub period: String,
    pub history: PriceHistory,
    pub updated_at: Option<String>,
    pub is_valid: bool,
}

#[must_use]
pub fn is_valid_ticker(ticker: &str) -> bool {
    TICKER_RE.is_match(ticker)
}

/// # Errors
///
/// Returns `InvalidPayload` when the portfolio is empty, names a malformed
/// ticker, or holds a negative or non-finite share count.
pub fn validate_portfolio(portfolio: &Portfolio) -> Result<(), ReportError> {
    if portfolio.is_empty() {
        return Err(ReportError::InvalidPayload(
            "portfolio has no holdings".to_string(),
        ));
    }
    for (ticker, shares) in portfolio {
        if !is_valid_ticker(ticker) {
            return Err(ReportError::InvalidPayload(format!(
                "invalid ticker symbol: {ticker:?}"
            )));
        }
        if !shares.is_finite() || *shares < 0.0 {
            return Err(ReportError::InvalidPayload(format!(
                "invalid share count for {ticker}: {shares}"
            )));
        }
    }
    Ok(())
}

/// Holdings of a portfolio excluding the benchmark ticker.
pub fn holdings<'a>(
    portfolio: &'a Portfolio,
    benchmark: &'a str,
) -> impl Iterator<Item = (&'a String, f64)> + 'a {
    portfolio
        .iter()
        .filter(move |(ticker, _)| ticker.as_str() != benchmark)
        .map(|(ticker, shares)| (ticker, *shares))
}
