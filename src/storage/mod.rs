//! AWS persistence: the reports table, the PDF bucket and the SQS queues

pub mod dynamo;
pub mod queue;
pub mod repository;
pub mod s3;

pub use queue::{QueueSender, SqsQueue};
pub use repository::{DynamoReportStore, ReportStore, StatusUpdate};
pub use s3::{ReportSink, S3ReportSink};
