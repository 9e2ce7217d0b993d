//! Market-data refresh Lambda, run on a schedule to keep the cache warm.

use lambda_runtime::{Error, LambdaEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::market::{RefreshSummary, refresh_all};
use crate::services::Services;

/// Optional overrides a scheduled or manual invocation may carry.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
    pub period: Option<String>,
}

impl RefreshRequest {
    /// Anything that is not a request object (scheduler events included)
    /// refreshes the whole universe with the configured period.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }
}

pub async fn run_refresh(services: &Services, request: &RefreshRequest) -> RefreshSummary {
    let config = &services.config;
    let period = request
        .period
        .as_deref()
        .unwrap_or(&config.market_data_period);
    info!(
        "Refreshing {} ticker(s), period {}, {} worker(s)",
        if request.tickers.is_empty() {
            "all".to_string()
        } else {
            request.tickers.len().to_string()
        },
        period,
        config.refresh_concurrency
    );

    refresh_all(
        services.market.as_ref(),
        services.quotes.as_ref(),
        &request.tickers,
        period,
        config.refresh_concurrency,
    )
    .await
}

/// Lambda handler for the market refresh.
///
/// # Errors
///
/// Only fails if the summary cannot be serialized.
pub async fn handler(services: &Services, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request = RefreshRequest::from_payload(&event.payload);
    let summary = run_refresh(services, &request).await;
    Ok(serde_json::to_value(summary)?)
}
