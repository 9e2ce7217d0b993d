//! Daily price history from the Yahoo Finance chart API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::warn;

use crate::core::models::{PriceBar, PriceHistory};
use crate::errors::ReportError;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; portfolio-reports/0.1)";
/// Retries after the first attempt for transient failures.
pub const MAX_RETRIES: usize = 3;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Daily bars for `ticker` covering `period` (for example `2mo`).
    async fn history(&self, ticker: &str, period: &str) -> Result<PriceHistory, ReportError>;
}

pub struct YahooFinanceClient {
    http: HttpClient,
    base_url: String,
}

impl YahooFinanceClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ReportError> {
        Self::with_base_url(CHART_URL)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ReportError> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn fetch_once(&self, ticker: &str, period: &str) -> Result<PriceHistory, FetchError> {
        let url = format!(
            "{}/{}?range={}&interval=1d",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&yahoo_symbol(ticker)),
            urlencoding::encode(period)
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchError::Transient(format!("{ticker}: HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;
        parse_chart_response(&body).map_err(FetchError::Permanent)
    }
}

enum FetchError {
    Transient(String),
    Permanent(ReportError),
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    async fn history(&self, ticker: &str, period: &str) -> Result<PriceHistory, ReportError> {
        // 100ms, 200ms, 400ms before jitter.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(MAX_RETRIES);

        RetryIf::spawn(
            strategy,
            || self.fetch_once(ticker, period),
            |e: &FetchError| {
                if let FetchError::Transient(msg) = e {
                    warn!("Retrying Yahoo Finance request: {}", msg);
                    true
                } else {
                    false
                }
            },
        )
        .await
        .map_err(|e| match e {
            FetchError::Transient(msg) => ReportError::HttpError(msg),
            FetchError::Permanent(err) => err,
        })
    }
}

/// Yahoo spells class shares with a dash (`BRK-B`).
#[must_use]
pub fn yahoo_symbol(ticker: &str) -> String {
    ticker.replace('.', "-")
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn session_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}

/// Parses a chart API response body. Bars with any missing value are
/// dropped; an empty result is not an error.
///
/// # Errors
///
/// Returns a parse error for malformed JSON and `TickerNotFound` when the
/// API reports an error for the symbol.
pub fn parse_chart_response(body: &str) -> Result<PriceHistory, ReportError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(ReportError::TickerNotFound(format!(
            "{}: {}",
            err.code.unwrap_or_else(|| "error".to_string()),
            err.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceHistory::default());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceHistory::default());
    };

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(PriceBar {
                date: session_date(*ts, result.meta.gmtoffset)?,
                open: at(&quote.open, i)?,
                high: at(&quote.high, i)?,
                low: at(&quote.low, i)?,
                close: at(&quote.close, i)?,
                volume: at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            })
        })
        .collect();

    Ok(PriceHistory::new(bars))
}
