use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::errors::ReportError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Stores a rendered PDF under `key`.
    async fn put_pdf(&self, key: &str, pdf: Vec<u8>) -> Result<(), ReportError>;
}

pub struct S3ReportSink {
    client: S3Client,
    bucket: String,
}

impl S3ReportSink {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ReportSink for S3ReportSink {
    async fn put_pdf(&self, key: &str, pdf: Vec<u8>) -> Result<(), ReportError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(pdf))
            .content_type(PDF_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| {
                ReportError::AwsError(format!(
                    "Failed to upload s3://{}/{key}: {e:?}",
                    self.bucket
                ))
            })?;
        Ok(())
    }
}
