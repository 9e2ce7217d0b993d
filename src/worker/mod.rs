//! Report worker Lambda: SQS batch in, dashboards in S3 out

pub mod generate;
pub mod handler;

// Re-export the main handler for convenience
pub use handler::{WorkerResponse, handler, process_event};
