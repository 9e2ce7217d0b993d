//! Number formatting for the dashboard cells.

fn group_thousands(integer_digits: &str) -> String {
    let len = integer_digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in integer_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234.5` -> `1,234.50`, keeping a leading `-` for negatives.
#[must_use]
pub fn grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// `$1,234.50`
#[must_use]
pub fn currency(value: f64) -> String {
    format!("${}", grouped(value))
}

/// `$+1,234.50` / `$-12.00`
#[must_use]
pub fn signed_currency(value: f64) -> String {
    let body = grouped(value);
    if body.starts_with('-') {
        format!("${body}")
    } else {
        format!("$+{body}")
    }
}

/// `+1.23%`
#[must_use]
pub fn signed_percent(value: f64) -> String {
    format!("{value:+.2}%")
}

/// `1.23%`
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Whole share count: `9`
#[must_use]
pub fn shares(value: f64) -> String {
    format!("{value:.0}")
}
