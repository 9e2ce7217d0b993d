//! Shared handles to the AWS-backed collaborators, built once per cold start.

use std::sync::Arc;

use aws_config::Region;

use crate::core::config::AppConfig;
use crate::errors::ReportError;
use crate::market::{DynamoMarketCache, MarketCache, QuoteSource, YahooFinanceClient};
use crate::storage::{
    DynamoReportStore, QueueSender, ReportSink, ReportStore, S3ReportSink, SqsQueue,
};

#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub reports: Arc<dyn ReportStore>,
    pub market: Arc<dyn MarketCache>,
    pub quotes: Arc<dyn QuoteSource>,
    pub sink: Arc<dyn ReportSink>,
    pub queue: Arc<dyn QueueSender>,
}

impl Services {
    /// Connects every collaborator to AWS in the configured region.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for market data cannot be built.
    pub async fn from_config(config: AppConfig) -> Result<Self, ReportError> {
        let shared = aws_config::from_env()
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        let dynamo = aws_sdk_dynamodb::Client::new(&shared);

        Ok(Self {
            reports: Arc::new(DynamoReportStore::new(
                dynamo.clone(),
                config.reports_table.clone(),
            )),
            market: Arc::new(DynamoMarketCache::new(dynamo, config.market_table.clone())),
            quotes: Arc::new(YahooFinanceClient::new()?),
            sink: Arc::new(S3ReportSink::new(
                aws_sdk_s3::Client::new(&shared),
                config.s3_bucket_name.clone().unwrap_or_default(),
            )),
            queue: Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&shared))),
            config,
        })
    }
}
