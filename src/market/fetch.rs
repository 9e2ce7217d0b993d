//! Price history lookup for a report: cache first, API second.

use futures::future::try_join_all;
use tracing::{error, info, warn};

use super::cache::MarketCache;
use super::yahoo::QuoteSource;
use crate::core::models::{MarketData, PriceHistory};
use crate::errors::ReportError;

/// Where a ticker's history came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Api,
}

impl DataSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Cache => "db",
            DataSource::Api => "api",
        }
    }
}

#[must_use]
pub fn not_found_message(ticker: &str) -> String {
    format!("Failed to fetch data for {ticker} from both DB and API")
}

/// Fetches one ticker. A cached history wins; otherwise the API result is
/// written back to the cache. When neither source has data the ticker is
/// marked invalid and `TickerNotFound` is returned.
///
/// # Errors
///
/// Returns `TickerNotFound` when no data is available for the ticker.
pub async fn fetch_single_ticker(
    cache: &dyn MarketCache,
    quotes: &dyn QuoteSource,
    ticker: &str,
    period: &str,
) -> Result<(PriceHistory, DataSource), ReportError> {
    match cache.get_market_data(ticker).await {
        Ok(Some(cached)) if !cached.is_valid => {
            info!("[{}] Cached as invalid, skipping lookups", ticker);
            return Err(ReportError::TickerNotFound(not_found_message(ticker)));
        }
        Ok(Some(cached)) if !cached.history.is_empty() => {
            return Ok((cached.history, DataSource::Cache));
        }
        Ok(_) => {}
        Err(e) => warn!("[{}] DB lookup failed: {}", ticker, e),
    }

    // Only an answer from the API that the symbol has no data poisons the
    // ticker; transport failures leave the cache alone.
    let unknown_symbol = match quotes.history(ticker, period).await {
        Ok(history) if !history.is_empty() => {
            if let Err(e) = cache.store_ticker_data(ticker, &history, period).await {
                warn!("[{}] Failed to cache API data: {}", ticker, e);
            }
            return Ok((history, DataSource::Api));
        }
        Ok(_) => {
            warn!("[{}] API returned no data", ticker);
            true
        }
        Err(e) => {
            warn!("[{}] API fetch failed: {}", ticker, e);
            matches!(e, ReportError::TickerNotFound(_))
        }
    };

    if unknown_symbol && let Err(e) = cache.mark_ticker_as_invalid(ticker).await {
        error!("[{}] Failed to mark ticker as invalid: {}", ticker, e);
    }
    Err(ReportError::TickerNotFound(not_found_message(ticker)))
}

/// Fetches every ticker concurrently and fails on the first error.
///
/// # Errors
///
/// Returns the first per-ticker error.
pub async fn fetch_data(
    cache: &dyn MarketCache,
    quotes: &dyn QuoteSource,
    tickers: &[String],
    period: &str,
) -> Result<MarketData, ReportError> {
    let fetched = try_join_all(tickers.iter().map(|ticker| async move {
        let (history, source) = fetch_single_ticker(cache, quotes, ticker, period).await?;
        info!("[{}] Fetched from {}", ticker, source.as_str());
        Ok::<_, ReportError>((ticker.clone(), history))
    }))
    .await?;

    Ok(fetched.into_iter().collect())
}
