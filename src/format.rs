use rust_decimal::{Decimal, RoundingStrategy};

use crate::normalize::NumberLocale;

/// Whole-unit currency with grouped thousands, e.g. `Rp 1.234.567`.
/// Missing values render as the formatted zero.
pub fn format_currency(value: Option<Decimal>, locale: &NumberLocale) -> String {
    let rounded = value
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits, locale.thousands_separator);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    if locale.currency_marker.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{} {sign}{grouped}", locale.currency_marker)
    }
}

/// Two decimal places and a trailing percent sign; missing renders `0.00%`.
pub fn format_percent(value: Option<Decimal>) -> String {
    let rounded = value
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{rounded:.2}%")
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
