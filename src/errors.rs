use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    TickerNotFound(String),

    #[error("Invalid report payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to parse data: {0}")]
    ParseError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to render report: {0}")]
    RenderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ReportError {
    /// Errors that no amount of retrying will fix. Reports failing this way
    /// are rejected and dead-lettered instead of being redelivered.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ReportError::TickerNotFound(_) | ReportError::InvalidPayload(_)
        )
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(error: reqwest::Error) -> Self {
        ReportError::HttpError(error.to_string())
    }
}

impl From<anyhow::Error> for ReportError {
    fn from(error: anyhow::Error) -> Self {
        ReportError::AwsError(error.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(error: serde_json::Error) -> Self {
        ReportError::ParseError(error.to_string())
    }
}

// Every AWS SDK crate re-exports the same smithy SdkError, so this covers
// DynamoDB, S3 and SQS alike.
impl<E, R> From<aws_sdk_sqs::error::SdkError<E, R>> for ReportError
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E, R>) -> Self {
        ReportError::AwsError(format!("{error:?}"))
    }
}
