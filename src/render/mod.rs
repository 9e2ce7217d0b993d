//! PDF rendering of the portfolio dashboard

pub mod canvas;
pub mod charts;
pub mod dashboard;
pub mod format;
pub mod table;

pub use dashboard::{DashboardData, create_pdf_dashboard};
