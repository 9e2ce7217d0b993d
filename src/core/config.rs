use std::env;

use crate::errors::ReportError;

pub const DEFAULT_REGION: &str = "ap-south-2";
pub const DEFAULT_REPORTS_TABLE: &str = "reports";
pub const DEFAULT_MARKET_TABLE: &str = "markets";
pub const DEFAULT_PERIOD: &str = "2mo";
pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_REFRESH_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub aws_region: String,
    pub reports_table: String,
    pub market_table: String,
    pub s3_bucket_name: Option<String>,
    pub sqs_queue_url: Option<String>,
    pub dlq_queue_url: Option<String>,
    pub market_data_period: String,
    pub benchmark_ticker: String,
    pub refresh_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.to_string(),
            reports_table: DEFAULT_REPORTS_TABLE.to_string(),
            market_table: DEFAULT_MARKET_TABLE.to_string(),
            s3_bucket_name: None,
            sqs_queue_url: None,
            dlq_queue_url: None,
            market_data_period: DEFAULT_PERIOD.to_string(),
            benchmark_ticker: DEFAULT_BENCHMARK.to_string(),
            refresh_concurrency: DEFAULT_REFRESH_CONCURRENCY,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        let refresh_concurrency = match optional_var("REFRESH_CONCURRENCY") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| format!("REFRESH_CONCURRENCY: {e}"))?
                .max(1),
            None => DEFAULT_REFRESH_CONCURRENCY,
        };

        Ok(Self {
            aws_region: var_or("AWS_REGION", DEFAULT_REGION),
            reports_table: var_or("TABLE_NAME", DEFAULT_REPORTS_TABLE),
            market_table: var_or("MARKET_TABLE_NAME", DEFAULT_MARKET_TABLE),
            s3_bucket_name: optional_var("S3_BUCKET_NAME"),
            sqs_queue_url: optional_var("SQS_QUEUE_URL"),
            dlq_queue_url: optional_var("DLQ_QUEUE_URL"),
            market_data_period: var_or("MARKET_DATA_PERIOD", DEFAULT_PERIOD),
            benchmark_ticker: var_or("BENCHMARK_TICKER", DEFAULT_BENCHMARK),
            refresh_concurrency,
        })
    }

    /// # Errors
    ///
    /// Returns an error when `S3_BUCKET_NAME` is not set.
    pub fn require_bucket(&self) -> Result<&str, ReportError> {
        self.s3_bucket_name
            .as_deref()
            .ok_or_else(|| ReportError::ConfigError("S3_BUCKET_NAME is not set".to_string()))
    }

    /// # Errors
    ///
    /// Returns an error when `SQS_QUEUE_URL` is not set.
    pub fn require_queue_url(&self) -> Result<&str, ReportError> {
        self.sqs_queue_url
            .as_deref()
            .ok_or_else(|| ReportError::ConfigError("SQS_QUEUE_URL is not set".to_string()))
    }

    /// # Errors
    ///
    /// Returns an error when `DLQ_QUEUE_URL` is not set.
    pub fn require_dlq_url(&self) -> Result<&str, ReportError> {
        self.dlq_queue_url
            .as_deref()
            .ok_or_else(|| ReportError::ConfigError("DLQ_QUEUE_URL is not set".to_string()))
    }
}
