use chrono::{DateTime, Utc};
use tracing::info;

use crate::analytics::{
    HISTORY_DAYS, calculate_advanced_metrics, calculate_portfolio_history,
    calculate_portfolio_metrics, summarize,
};
use crate::core::models::{Portfolio, validate_portfolio};
use crate::errors::ReportError;
use crate::market::{MarketCache, QuoteSource, fetch_data};
use crate::render::{DashboardData, create_pdf_dashboard};

/// S3 object key of a report's dashboard.
#[must_use]
pub fn report_key(batch_no: i64, report_id: i64, at: DateTime<Utc>) -> String {
    format!(
        "reports/batch-{batch_no}/{report_id}/portfolio_dashboard_{}.pdf",
        at.format("%Y%m%d%H%M%S")
    )
}

/// Fetches market data for every ticker of the portfolio, runs the analytics
/// and renders the dashboard PDF.
///
/// # Errors
///
/// Returns `InvalidPayload` for a malformed portfolio, `TickerNotFound` when
/// any ticker has no data, and a render error if the PDF cannot be built.
pub async fn collect_data_and_generate_report(
    cache: &dyn MarketCache,
    quotes: &dyn QuoteSource,
    portfolio: &Portfolio,
    period: &str,
    benchmark: &str,
    log_prefix: &str,
) -> Result<Vec<u8>, ReportError> {
    validate_portfolio(portfolio)?;

    let tickers: Vec<String> = portfolio.keys().cloned().collect();
    info!("{} Fetching market data for tickers: {:?}", log_prefix, tickers);
    let data = fetch_data(cache, quotes, &tickers, period).await?;

    info!("{} Calculating portfolio metrics...", log_prefix);
    let metrics = calculate_portfolio_metrics(portfolio, &data, benchmark);

    info!("{} Calculating portfolio history...", log_prefix);
    let history = calculate_portfolio_history(portfolio, &data, HISTORY_DAYS, benchmark);

    info!("{} Calculating advanced metrics...", log_prefix);
    let risk = calculate_advanced_metrics(&history, data.get(benchmark));

    info!(
        "{} Generating PDF... total_value=${:.2}",
        log_prefix, metrics.total_value
    );
    create_pdf_dashboard(&DashboardData {
        metrics: &metrics,
        summary: summarize(&metrics),
        history: &history,
        risk,
        as_of: Utc::now().date_naive(),
    })
}
