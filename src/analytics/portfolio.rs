use serde::Serialize;

use crate::core::models::{MarketData, Portfolio, holdings};

/// Bars back used as the cost basis, roughly one trading month.
pub const COST_BASIS_LOOKBACK: usize = 30;

/// Trailing window of the portfolio value trend.
pub const HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub current_price: f64,
    /// Percent change of the latest close against the previous one.
    pub day_change: f64,
    pub position_value: f64,
    pub cost_basis: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub holdings: Vec<Holding>,
    pub total_value: f64,
    pub total_cost: f64,
}

/// Headline numbers of the dashboard summary box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub daily_pnl: f64,
    pub daily_pnl_pct: f64,
    pub overall_return: f64,
}

/// Values every holding except the benchmark. Tickers without price data are
/// skipped.
#[must_use]
pub fn calculate_portfolio_metrics(
    portfolio: &Portfolio,
    data: &MarketData,
    benchmark: &str,
) -> PortfolioMetrics {
    let mut metrics = PortfolioMetrics::default();

    for (ticker, shares) in holdings(portfolio, benchmark) {
        let Some(history) = data.get(ticker).filter(|h| !h.is_empty()) else {
            continue;
        };
        let Some(current_price) = history.close_from_end(1) else {
            continue;
        };

        let day_change = match history.close_from_end(2) {
            Some(prev_close) if prev_close != 0.0 => {
                (current_price - prev_close) / prev_close * 100.0
            }
            _ => 0.0,
        };

        let cost_basis_price = history
            .close_from_end(COST_BASIS_LOOKBACK)
            .or_else(|| history.bars.first().map(|b| b.close))
            .unwrap_or(current_price);

        let position_value = current_price * shares;
        let cost_basis = cost_basis_price * shares;

        metrics.total_value += position_value;
        metrics.total_cost += cost_basis;
        metrics.holdings.push(Holding {
            ticker: ticker.clone(),
            shares,
            current_price,
            day_change,
            position_value,
            cost_basis,
        });
    }

    metrics
}

/// Daily value of the non-benchmark holdings over the last `days` bars,
/// capped by the shortest available history.
#[must_use]
pub fn calculate_portfolio_history(
    portfolio: &Portfolio,
    data: &MarketData,
    days: usize,
    benchmark: &str,
) -> Vec<f64> {
    let tracked: Vec<_> = holdings(portfolio, benchmark)
        .filter_map(|(ticker, shares)| data.get(ticker).map(|h| (h, shares)))
        .collect();

    let Some(shortest) = tracked.iter().map(|(h, _)| h.len()).min() else {
        return Vec::new();
    };
    let days = days.min(shortest);

    (1..=days)
        .rev()
        .map(|back| {
            tracked
                .iter()
                .filter_map(|(history, shares)| history.close_from_end(back).map(|c| c * shares))
                .sum()
        })
        .collect()
}

#[must_use]
pub fn summarize(metrics: &PortfolioMetrics) -> PortfolioSummary {
    let previous_value: f64 = metrics
        .holdings
        .iter()
        .map(|h| h.position_value / (1.0 + h.day_change / 100.0))
        .sum();
    let daily_pnl = metrics.total_value - previous_value;
    let daily_pnl_pct = if metrics.total_value == 0.0 {
        0.0
    } else {
        daily_pnl / metrics.total_value * 100.0
    };
    let overall_return = if metrics.total_cost > 0.0 {
        (metrics.total_value - metrics.total_cost) / metrics.total_cost * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_value: metrics.total_value,
        daily_pnl,
        daily_pnl_pct,
        overall_return,
    }
}
