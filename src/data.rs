use std::{cmp::Ordering, fmt};

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized cell. Missing cells are represented as `None` by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Value {
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

/// Column type inferred from content after normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    Date,
    Text,
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => n.normalize().to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Date(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Parses calendar dates as exported by spreadsheets, including bare months
/// (`2024-03`, `Mar 2024`) which resolve to the first day of the month.
/// Ambiguous slash dates read month first: `01/02/2024` is January 2.
pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    const MONTH_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %Y %d", "%B %Y %d", "%b-%Y-%d"];

    let trimmed = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed.date());
        }
    }
    for fmt in MONTH_FORMATS {
        let separator = if fmt.contains(' ') {
            " "
        } else if fmt.contains('/') {
            "/"
        } else {
            "-"
        };
        let candidate = format!("{trimmed}{separator}01");
        if let Ok(parsed) = NaiveDate::parse_from_str(&candidate, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("05/06/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
        assert_eq!(parse_naive_date("2024-05-06 08:15:00").unwrap(), expected);
    }

    #[test]
    fn parse_naive_date_accepts_bare_months() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_naive_date("2024-03").unwrap(), expected);
        assert_eq!(parse_naive_date("Mar 2024").unwrap(), expected);
        assert_eq!(parse_naive_date("March 2024").unwrap(), expected);
        assert!(parse_naive_date("not a month").is_err());
    }

    #[test]
    fn ambiguous_slash_dates_read_month_first() {
        assert_eq!(
            parse_naive_date("01/02/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        // only valid day first
        assert_eq!(
            parse_naive_date("25/12/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
        );
    }

    #[test]
    fn number_display_drops_trailing_zeros() {
        let value = Value::Number(Decimal::from_str("1500.00").unwrap());
        assert_eq!(value.as_display(), "1500");
    }

    #[test]
    fn heterogeneous_values_order_by_kind() {
        let number = Value::Number(Decimal::ONE);
        let text = Value::Text("a".to_string());
        assert!(number < text);
    }
}
