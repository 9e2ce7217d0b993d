//! Market data: the DynamoDB cache, the Yahoo Finance client and the
//! lookups built on them

pub mod cache;
pub mod fetch;
pub mod refresh;
pub mod yahoo;

pub use cache::{DynamoMarketCache, MarketCache};
pub use fetch::{DataSource, fetch_data, fetch_single_ticker};
pub use refresh::{RefreshSummary, refresh_all};
pub use yahoo::{QuoteSource, YahooFinanceClient};
