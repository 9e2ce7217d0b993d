//! Scheduled cache warm-up for the whole ticker universe.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::cache::MarketCache;
use super::yahoo::QuoteSource;
use crate::core::universe::all_tickers;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub success: usize,
    pub failed: Vec<String>,
}

async fn fetch_and_store(
    cache: &dyn MarketCache,
    quotes: &dyn QuoteSource,
    ticker: &str,
    period: &str,
) -> bool {
    let history = match quotes.history(ticker, period).await {
        Ok(history) if history.is_empty() => {
            warn!("[SKIP] {} - no data returned", ticker);
            return false;
        }
        Ok(history) => history,
        Err(e) => {
            warn!("[FAIL] {} - {}", ticker, e);
            return false;
        }
    };

    match cache.store_ticker_data(ticker, &history, period).await {
        Ok(()) => {
            info!("[OK] {} - {} records stored", ticker, history.len());
            true
        }
        Err(e) => {
            warn!("[FAIL] {} - {}", ticker, e);
            false
        }
    }
}

/// Refreshes `tickers` (the full universe when empty) with at most
/// `max_workers` requests in flight. Failures are collected, never raised.
pub async fn refresh_all(
    cache: &dyn MarketCache,
    quotes: &dyn QuoteSource,
    tickers: &[String],
    period: &str,
    max_workers: usize,
) -> RefreshSummary {
    let tickers: Vec<String> = if tickers.is_empty() {
        all_tickers()
    } else {
        tickers.to_vec()
    };

    let results: Vec<(String, bool)> = stream::iter(tickers.iter())
        .map(|ticker| async move {
            let ok = fetch_and_store(cache, quotes, ticker, period).await;
            (ticker.clone(), ok)
        })
        .buffer_unordered(max_workers.max(1))
        .collect()
        .await;

    // Report failures in universe order regardless of completion order.
    let mut summary = RefreshSummary::default();
    for ticker in &tickers {
        match results.iter().find(|(t, _)| t == ticker) {
            Some((_, true)) => summary.success += 1,
            _ => summary.failed.push(ticker.clone()),
        }
    }

    info!(
        "Done: {}/{} tickers stored, {} failed",
        summary.success,
        tickers.len(),
        summary.failed.len()
    );
    if !summary.failed.is_empty() {
        info!("Failed: {:?}", summary.failed);
    }
    summary
}
