// Lambda entry point for the report worker

use std::sync::Arc;

use lambda_runtime::{Error, run, service_fn};
use portfolio_reports::core::config::AppConfig;
use portfolio_reports::services::Services;
use portfolio_reports::worker::handler;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    portfolio_reports::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let services = Arc::new(Services::from_config(config).await?);

    run(service_fn(move |event| {
        let services = Arc::clone(&services);
        async move { handler(&services, event).await }
    }))
    .await
}
