//! Portfolio valuation and risk statistics

pub mod portfolio;
pub mod risk;

pub use portfolio::{
    HISTORY_DAYS, Holding, PortfolioMetrics, PortfolioSummary, calculate_portfolio_history,
    calculate_portfolio_metrics, summarize,
};
pub use risk::{RiskMetrics, calculate_advanced_metrics};
