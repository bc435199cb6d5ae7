//! Display formatting for dashboard figures.
//!
//! Only the rendered strings are rounded; raw values travel alongside them
//! untouched.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// `$1,234.50`, negatives as `$-1,234.50`
pub fn format_currency(symbol: &str, value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{symbol}{sign}{}.{fraction}", group_thousands(whole))
}

/// Currency formatting for model output that is not a `Decimal`.
///
/// Non-finite values cannot be represented and render as-is.
pub fn format_currency_f64(symbol: &str, value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => format_currency(symbol, decimal),
        None => format!("{symbol}{value}"),
    }
}

/// `1,234`
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Whole-number percentage of a fraction, `0.30` as `30%`
pub fn format_percent(fraction: Decimal) -> String {
    let percent = (fraction * Decimal::ONE_HUNDRED).round_dp(0).normalize();
    format!("{percent}%")
}

/// Forecast table date column, `2005-07`
pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
