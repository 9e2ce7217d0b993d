use serde::Serialize;

use crate::core::models::PriceHistory;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub sharpe: f64,
    /// Annualized, in percent.
    pub volatility: f64,
    pub beta: f64,
    /// Worst peak-to-trough decline, in percent (zero or negative).
    pub max_drawdown: f64,
}

/// Simple returns between consecutive values, one per window. A move off a
/// zero value stays in place as a non-finite return so the series keeps its
/// alignment with other return series.
#[must_use]
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// The finite returns of a series, in order.
#[must_use]
pub fn finite(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|r| r.is_finite()).collect()
}

/// Pairs up the trailing returns of both series by position and drops every
/// pair where either side is not finite.
#[must_use]
pub fn aligned_pairs(ours: &[f64], theirs: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = ours.len().min(theirs.len());
    ours[ours.len() - n..]
        .iter()
        .zip(&theirs[theirs.len() - n..])
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1).
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sample covariance (n - 1) of two equally long series.
#[must_use]
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (ma, mb) = (mean(&a[..n]), mean(&b[..n]));
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    sum / (n - 1) as f64
}

/// Population variance (n).
#[must_use]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Most negative drawdown of the compounded return curve, in percent.
#[must_use]
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        worst = worst.min((cumulative - peak) / peak);
    }
    worst * 100.0
}

fn beta(returns: &[f64], portfolio_len: usize, benchmark: Option<&PriceHistory>) -> f64 {
    let Some(benchmark) = benchmark.filter(|b| !b.is_empty()) else {
        return 1.0;
    };

    let closes = benchmark.closes();
    let window = &closes[closes.len().saturating_sub(portfolio_len)..];
    let benchmark_returns = pct_change(window);

    let (ours, theirs) = aligned_pairs(returns, &benchmark_returns);
    if ours.len() < 2 {
        return 1.0;
    }

    let variance = population_variance(&theirs);
    if variance == 0.0 {
        return 1.0;
    }
    sample_covariance(&ours, &theirs) / variance
}

/// Risk metrics of a daily portfolio value series against the benchmark.
/// Zero risk-free rate.
#[must_use]
pub fn calculate_advanced_metrics(
    portfolio_values: &[f64],
    benchmark: Option<&PriceHistory>,
) -> RiskMetrics {
    let returns = pct_change(portfolio_values);
    let clean = finite(&returns);
    let std = sample_std(&clean);
    let annualizer = TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe = if std == 0.0 {
        0.0
    } else {
        mean(&clean) / std * annualizer
    };

    RiskMetrics {
        sharpe,
        volatility: std * annualizer * 100.0,
        beta: beta(&returns, portfolio_values.len(), benchmark),
        max_drawdown: max_drawdown(&clean),
    }
}
