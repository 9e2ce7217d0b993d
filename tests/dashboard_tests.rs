mod common;

use chrono::NaiveDate;
use common::*;
use portfolio_reports::analytics::{
    HISTORY_DAYS, calculate_advanced_metrics, calculate_portfolio_history,
    calculate_portfolio_metrics, summarize,
};
use portfolio_reports::core::models::MarketData;
use portfolio_reports::render::dashboard::holdings_table;
use portfolio_reports::render::format::{currency, percent, shares, signed_currency, signed_percent};
use portfolio_reports::render::{DashboardData, create_pdf_dashboard};

fn render(holdings: &[(&str, f64)], data: &MarketData) -> Vec<u8> {
    let portfolio = portfolio(holdings);
    let metrics = calculate_portfolio_metrics(&portfolio, data, "SPY");
    let history = calculate_portfolio_history(&portfolio, data, HISTORY_DAYS, "SPY");
    create_pdf_dashboard(&DashboardData {
        metrics: &metrics,
        summary: summarize(&metrics),
        history: &history,
        risk: calculate_advanced_metrics(&history, data.get("SPY")),
        as_of: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    })
    .unwrap()
}

#[test]
fn test_currency_formatting() {
    assert_eq!(currency(1234.5), "$1,234.50");
    assert_eq!(signed_currency(1234.5), "$+1,234.50");
    assert_eq!(signed_currency(-12.0), "$-12.00");
    assert_eq!(signed_currency(0.0), "$+0.00");
}

#[test]
fn test_percent_and_share_formatting() {
    assert_eq!(signed_percent(1.234), "+1.23%");
    assert_eq!(signed_percent(-0.5), "-0.50%");
    assert_eq!(percent(12.345), "12.35%");
    assert_eq!(shares(9.0), "9");
}

#[test]
fn test_dashboard_is_a_pdf() {
    let data: MarketData = [
        ("AAPL".to_string(), rising(180.0, 42)),
        ("MSFT".to_string(), rising(400.0, 42)),
        ("SPY".to_string(), rising(500.0, 42)),
    ]
    .into_iter()
    .collect();

    let pdf = render(&[("AAPL", 9.0), ("MSFT", 13.0), ("SPY", 20.0)], &data);

    assert!(pdf.starts_with(b"%PDF"));
    assert!(pdf.len() > 1_000);
}

#[test]
fn test_dashboard_with_many_holdings_spills_onto_more_pages() {
    let tickers: Vec<String> = (0..60).map(|i| format!("T{i}")).collect();
    let mut data: MarketData = tickers
        .iter()
        .map(|t| (t.clone(), rising(50.0, 35)))
        .collect();
    data.insert("SPY".to_string(), rising(500.0, 35));
    let holdings: Vec<(&str, f64)> = tickers.iter().map(|t| (t.as_str(), 1.0)).collect();

    let pdf = render(&holdings, &data);
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_dashboard_renders_without_history() {
    let pdf = render(&[], &MarketData::new());
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_holdings_table_has_a_row_per_position() {
    let data: MarketData = [
        ("AAPL".to_string(), rising(180.0, 5)),
        ("MSFT".to_string(), history(&[410.0, 400.0])),
    ]
    .into_iter()
    .collect();
    let metrics = calculate_portfolio_metrics(&portfolio(&[("AAPL", 1.0), ("MSFT", 1.0)]), &data, "SPY");

    let table = holdings_table(&metrics);

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0].text, "AAPL");
    assert_eq!(table.rows[1][3].text, "-2.44%");
}
