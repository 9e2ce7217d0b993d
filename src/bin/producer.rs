// Local batch producer: `report-producer [COUNT]`

use anyhow::{Context, Result};
use chrono::Local;
use portfolio_reports::core::config::AppConfig;
use portfolio_reports::producer::{DEFAULT_REPORT_COUNT, batch_number, produce_batch};
use portfolio_reports::services::Services;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    portfolio_reports::setup_logging();

    let count = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("invalid report count: {arg}"))?,
        None => DEFAULT_REPORT_COUNT,
    };

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let queue_url = config.require_queue_url()?.to_string();
    let benchmark = config.benchmark_ticker.clone();
    let services = Services::from_config(config).await?;

    let batch_no = batch_number(Local::now());
    info!("Producing {} report(s) for batch {}", count, batch_no);

    let mut rng = StdRng::from_entropy();
    let summary = produce_batch(
        services.reports.as_ref(),
        services.queue.as_ref(),
        &queue_url,
        batch_no,
        count,
        &benchmark,
        &mut rng,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
