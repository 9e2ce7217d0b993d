//! Market data cache table, one row per ticker.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::core::models::{CachedMarketData, PriceBar, PriceHistory};
use crate::errors::ReportError;
use crate::storage::dynamo::{Item, get_bool, get_optional_string, get_string, num, string};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[async_trait]
pub trait MarketCache: Send + Sync {
    async fn get_market_data(&self, ticker: &str) -> Result<Option<CachedMarketData>, ReportError>;

    async fn store_ticker_data(
        &self,
        ticker: &str,
        history: &PriceHistory,
        period: &str,
    ) -> Result<(), ReportError>;

    /// Flags the ticker so later reports reject it without another lookup.
    async fn mark_ticker_as_invalid(&self, ticker: &str) -> Result<(), ReportError>;
}

pub struct DynamoMarketCache {
    client: DynamoClient,
    table: String,
}

impl DynamoMarketCache {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

fn bar_to_attribute(bar: &PriceBar) -> AttributeValue {
    AttributeValue::M(HashMap::from([
        (
            "date".to_string(),
            string(bar.date.format(DATE_FORMAT).to_string()),
        ),
        ("Open".to_string(), num(bar.open)),
        ("High".to_string(), num(bar.high)),
        ("Low".to_string(), num(bar.low)),
        ("Close".to_string(), num(bar.close)),
        ("Volume".to_string(), num(bar.volume)),
    ]))
}

fn price(record: &Item, name: &str) -> Result<f64, ReportError> {
    let raw = record
        .get(name)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| ReportError::ParseError(format!("record is missing `{name}`")))?;
    raw.parse::<f64>()
        .map_err(|_| ReportError::ParseError(format!("record `{name}` is not numeric: {raw}")))
}

fn attribute_to_bar(value: &AttributeValue) -> Result<PriceBar, ReportError> {
    let record = value
        .as_m()
        .map_err(|_| ReportError::ParseError("market record is not a map".to_string()))?;
    let date_raw = get_string(record, "date")?;
    let date = NaiveDate::parse_from_str(&date_raw, DATE_FORMAT)
        .map_err(|e| ReportError::ParseError(format!("record date {date_raw:?}: {e}")))?;

    Ok(PriceBar {
        date,
        open: price(record, "Open")?,
        high: price(record, "High")?,
        low: price(record, "Low")?,
        close: price(record, "Close")?,
        // Volumes are whole shares; a cached fractional value is truncated.
        volume: price(record, "Volume")?.max(0.0) as u64,
    })
}

#[must_use]
pub fn market_item(ticker: &str, history: &PriceHistory, period: &str, now: &str) -> Item {
    let records = history.bars.iter().map(bar_to_attribute).collect();
    HashMap::from([
        ("ticker".to_string(), string(ticker)),
        ("period".to_string(), string(period)),
        ("records".to_string(), AttributeValue::L(records)),
        ("record_count".to_string(), num(history.len())),
        ("updated_at".to_string(), string(now)),
        ("is_valid".to_string(), AttributeValue::Bool(true)),
    ])
}

/// # Errors
///
/// Returns a parse error if the row or any of its records is malformed.
pub fn parse_market_item(item: &Item) -> Result<CachedMarketData, ReportError> {
    let bars = match item.get("records").and_then(|v| v.as_l().ok()) {
        Some(records) => records
            .iter()
            .map(attribute_to_bar)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(CachedMarketData {
        ticker: get_string(item, "ticker")?,
        period: get_optional_string(item, "period").unwrap_or_default(),
        history: PriceHistory::new(bars),
        updated_at: get_optional_string(item, "updated_at"),
        // Rows written before the flag existed are valid.
        is_valid: get_bool(item, "is_valid").unwrap_or(true),
    })
}

#[async_trait]
impl MarketCache for DynamoMarketCache {
    async fn get_market_data(&self, ticker: &str) -> Result<Option<CachedMarketData>, ReportError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("ticker", string(ticker))
            .send()
            .await?;

        output.item().map(parse_market_item).transpose()
    }

    async fn store_ticker_data(
        &self,
        ticker: &str,
        history: &PriceHistory,
        period: &str,
    ) -> Result<(), ReportError> {
        let item = market_item(ticker, history, period, &Utc::now().to_rfc3339());
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await?;
        info!("[DB] Cached {} - {} records", ticker, history.len());
        Ok(())
    }

    async fn mark_ticker_as_invalid(&self, ticker: &str) -> Result<(), ReportError> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key("ticker", string(ticker))
            .update_expression("SET is_valid = :false, updated_at = :ts")
            .expression_attribute_values(":false", AttributeValue::Bool(false))
            .expression_attribute_values(":ts", string(Utc::now().to_rfc3339()))
            .send()
            .await?;
        info!("[DB] Marked {} as invalid", ticker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_rows_parse_back_into_history() {
        let bar = PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: 10.5,
            high: 11.25,
            low: 10.0,
            close: 11.0,
            volume: 1_200,
        };
        let history = PriceHistory::new(vec![bar]);
        let item = market_item("AAPL", &history, "2mo", "2024-03-02T00:00:00Z");

        let cached = parse_market_item(&item).unwrap();
        assert_eq!(cached.ticker, "AAPL");
        assert_eq!(cached.period, "2mo");
        assert!(cached.is_valid);
        assert_eq!(cached.history, history);
    }

    #[test]
    fn rows_without_records_are_empty() {
        let item = HashMap::from([
            ("ticker".to_string(), string("ZZZZ")),
            ("is_valid".to_string(), AttributeValue::Bool(false)),
        ]);
        let cached = parse_market_item(&item).unwrap();
        assert!(cached.history.is_empty());
        assert!(!cached.is_valid);
    }
}
