//! Cell normalization for spreadsheet exports.
//!
//! Numeric columns arrive decorated (`Rp 1.234.567`, `45%`, ` 12,5 `). The
//! normalizer strips that decoration under a [`NumberLocale`] and parses the
//! remainder as a [`Decimal`]. Conversion is decided per column: a column is
//! promoted to numbers only when at least one cell parses, in which case the
//! cells that do not parse become missing. A column where nothing parses keeps
//! its text untouched.
//!
//! Identity and categorical columns ([`EXEMPT_COLUMNS`]) are never converted,
//! and known date columns ([`DATE_COLUMNS`]) are parsed as calendar dates with
//! the same all-or-nothing rule. Values that are already typed pass through,
//! so normalizing twice is a no-op.

use std::str::FromStr;

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    data::{ColumnKind, Value, parse_naive_date},
    dataset::{Cell, Dataset},
};

pub const EXEMPT_COLUMNS: &[&str] = &[
    "Employee Name",
    "Project Name",
    "Role",
    "Team",
    "Category",
    "Status",
    "Status Allocation",
    "Employee_id",
    "Employee Id",
];

pub const DATE_COLUMNS: &[&str] = &[
    "Start Date",
    "End Date",
    "Month",
    "Growth Month",
    "Month_Key",
    "Join Date",
];

/// Decoration rules for localized numbers. Defaults follow Indonesian Rupiah
/// exports: `Rp` prefix, `.` for thousands and `,` for decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberLocale {
    pub currency_marker: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            currency_marker: "Rp".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }
}

impl NumberLocale {
    /// Parses one decorated numeric string. Returns `None` when nothing
    /// numeric remains after stripping.
    pub fn parse_number(&self, raw: &str) -> Option<Decimal> {
        let mut body = raw.trim().to_string();
        if !self.currency_marker.is_empty() {
            body = body.replace(&self.currency_marker, "");
        }
        let mut cleaned = String::with_capacity(body.len());
        for ch in body.chars() {
            if ch == self.thousands_separator || ch == '%' || ch.is_whitespace() {
                continue;
            }
            if ch == self.decimal_separator {
                cleaned.push('.');
            } else {
                cleaned.push(ch);
            }
        }
        if cleaned.is_empty() {
            return None;
        }
        Decimal::from_str(&cleaned).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    locale: NumberLocale,
}

impl Normalizer {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    /// Normalizes every column of `dataset` in place and returns it.
    pub fn normalize_dataset(&self, mut dataset: Dataset) -> Dataset {
        for idx in 0..dataset.headers.len() {
            let header = dataset.headers[idx].clone();
            let cells = dataset
                .rows
                .iter_mut()
                .map(|row| row[idx].take())
                .collect::<Vec<_>>();
            let (kind, normalized) = if is_listed(&header, EXEMPT_COLUMNS) {
                (ColumnKind::Text, cells)
            } else if is_listed(&header, DATE_COLUMNS) {
                self.normalize_date_column(cells)
            } else {
                self.normalize_numeric_column(cells)
            };
            debug!("Column '{header}' of '{}' normalized as {kind:?}", dataset.name);
            for (row, cell) in dataset.rows.iter_mut().zip(normalized) {
                row[idx] = cell;
            }
            dataset.kinds[idx] = kind;
        }
        dataset
    }

    pub fn normalize_numeric_column(&self, cells: Vec<Cell>) -> (ColumnKind, Vec<Cell>) {
        let parsed = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Number(n)) => Some(*n),
                Some(Value::Text(raw)) => self.locale.parse_number(raw),
                _ => None,
            })
            .collect::<Vec<_>>();
        if parsed.iter().all(Option::is_none) {
            return (infer_passthrough_kind(&cells), cells);
        }
        let cells = parsed.into_iter().map(|n| n.map(Value::Number)).collect();
        (ColumnKind::Number, cells)
    }

    pub fn normalize_date_column(&self, cells: Vec<Cell>) -> (ColumnKind, Vec<Cell>) {
        let parsed = cells
            .iter()
            .map(|cell| match cell {
                Some(Value::Date(d)) => Some(*d),
                Some(Value::Text(raw)) => parse_naive_date(raw).ok(),
                _ => None,
            })
            .collect::<Vec<_>>();
        if parsed.iter().all(Option::is_none) {
            return (infer_passthrough_kind(&cells), cells);
        }
        let cells = parsed.into_iter().map(|d| d.map(Value::Date)).collect();
        (ColumnKind::Date, cells)
    }
}

fn is_listed(header: &str, names: &[&str]) -> bool {
    names.iter().any(|name| name.eq_ignore_ascii_case(header))
}

// Untouched columns keep whatever type their present cells already share.
fn infer_passthrough_kind(cells: &[Cell]) -> ColumnKind {
    let mut present = cells.iter().flatten();
    match present.next() {
        Some(Value::Number(_)) if present.all(|v| matches!(v, Value::Number(_))) => {
            ColumnKind::Number
        }
        Some(Value::Date(_)) if present.all(|v| matches!(v, Value::Date(_))) => ColumnKind::Date,
        _ => ColumnKind::Text,
    }
}
