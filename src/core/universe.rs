//! The ticker universe: every symbol the cache refresh keeps warm, with the
//! share counts random portfolios are drawn with.

pub const UNIVERSE: [(&str, u32); 56] = [
    ("AAPL", 9),
    ("MSFT", 13),
    ("GOOGL", 4),
    ("TSLA", 7),
    ("NVDA", 10),
    ("SPY", 20),
    ("AMZN", 2),
    ("META", 2),
    ("BRK.B", 2),
    ("AVGO", 2),
    ("GOOG", 2),
    ("JPM", 2),
    ("LLY", 2),
    ("V", 2),
    ("UNH", 2),
    ("XOM", 2),
    ("MA", 2),
    ("PG", 2),
    ("JNJ", 2),
    ("HD", 2),
    ("COST", 2),
    ("ORCL", 2),
    ("AMD", 2),
    ("BAC", 2),
    ("NFLX", 2),
    ("CRM", 2),
    ("ABT", 2),
    ("WMT", 2),
    ("TMO", 2),
    ("CVX", 2),
    ("ACN", 2),
    ("KO", 2),
    ("AVY", 2),
    ("PM", 2),
    ("DIS", 2),
    ("PFE", 2),
    ("INTU", 2),
    ("ADBE", 2),
    ("TXN", 2),
    ("CSCO", 2),
    ("NEE", 2),
    ("WFC", 2),
    ("ABBV", 2),
    ("DHR", 2),
    ("COP", 2),
    ("IBM", 2),
    ("QCOM", 2),
    ("CAT", 2),
    ("RTX", 2),
    ("AXP", 2),
    ("GS", 2),
    ("BLK", 2),
    ("AMGN", 2),
    ("BX", 2),
    ("PLD", 2),
    ("LIN", 2),
];

/// Every ticker of the universe, in table order.
#[must_use]
pub fn all_tickers() -> Vec<String> {
    UNIVERSE.iter().map(|(ticker, _)| (*ticker).to_string()).collect()
}
