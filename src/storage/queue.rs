use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;

use crate::errors::ReportError;

#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(&self, queue_url: &str, body: String) -> Result<(), ReportError>;
}

pub struct SqsQueue {
    client: SqsClient,
}

impl SqsQueue {
    #[must_use]
    pub fn new(client: SqsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueSender for SqsQueue {
    async fn send(&self, queue_url: &str, body: String) -> Result<(), ReportError> {
        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| ReportError::AwsError(format!("Failed to send message to SQS: {e:?}")))?;
        Ok(())
    }
}
