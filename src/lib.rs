/// Portfolio Reports - batch generation of PDF portfolio dashboards on AWS.
///
/// This crate implements a producer and three Lambdas around one SQS queue:
/// 1. A producer that creates report rows in DynamoDB and enqueues them
/// 2. A Worker Lambda that fetches market data, computes portfolio and risk
///    metrics, renders a PDF dashboard and uploads it to S3
/// 3. A DLQ Lambda that marks dead-lettered reports as failed
/// 4. A Market Refresh Lambda that keeps the DynamoDB price cache warm
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SQS for report queuing, with a dead-letter queue for rejected reports
/// - DynamoDB for report status rows and the market data cache
/// - S3 for the generated PDF dashboards
/// - Yahoo Finance for daily price history
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use portfolio_reports::core::config::AppConfig;
/// use portfolio_reports::core::models::Portfolio;
/// use portfolio_reports::services::Services;
/// use portfolio_reports::worker::generate::collect_data_and_generate_report;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Set up structured logging
///     portfolio_reports::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let services = Services::from_config(config).await?;
///
///     let portfolio: Portfolio = [("AAPL".to_string(), 10.0), ("SPY".to_string(), 5.0)]
///         .into_iter()
///         .collect();
///     let pdf = collect_data_and_generate_report(
///         services.market.as_ref(),
///         services.quotes.as_ref(),
///         &portfolio,
///         &services.config.market_data_period,
///         &services.config.benchmark_ticker,
///         "[demo]",
///     )
///     .await?;
///     std::fs::write("dashboard.pdf", pdf)?;
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod analytics;
pub mod core;
pub mod dlq;
pub mod errors;
pub mod events;
pub mod market;
pub mod producer;
pub mod refresh;
pub mod render;
pub mod services;
pub mod storage;
pub mod worker;

pub use errors::ReportError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called at the start of each Lambda
/// handler. Calling it again once a subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// portfolio_reports::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
