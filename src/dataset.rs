//! In-memory tabular datasets.
//!
//! A [`Dataset`] is a named, ordered collection of rows sharing one header.
//! Cells are `Option<Value>`: `None` is the missing-value sentinel and is never
//! coerced to zero here. Column types are tracked per column in
//! [`ColumnKind`] and start out as [`ColumnKind::Text`] until the normalizer
//! promotes them.

use std::{collections::HashMap, io::Read};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::Serialize;

use crate::{
    data::{ColumnKind, Value},
    io_utils,
};

pub type Cell = Option<Value>;
pub type Row = Vec<Cell>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
            kinds: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a text-typed dataset from raw string rows. Header names are
    /// trimmed and made unique; empty cells become missing.
    pub fn from_raw(name: impl Into<String>, headers: &[String], rows: Vec<Vec<String>>) -> Self {
        let headers = unique_headers(headers);
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|raw| {
                (0..width)
                    .map(|idx| match raw.get(idx) {
                        Some(cell) if !cell.trim().is_empty() => Some(Value::Text(cell.clone())),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        Self {
            name: name.into(),
            kinds: vec![ColumnKind::Text; width],
            headers,
            rows,
        }
    }

    /// Reads delimited text with a header row.
    pub fn read_delimited<R: Read>(
        name: &str,
        reader: R,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(reader, delimiter, true);
        let headers = io_utils::reader_headers(&mut reader, encoding)
            .with_context(|| format!("Reading header row of '{name}'"))?;
        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record =
                record.with_context(|| format!("Reading row {} of '{name}'", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {} of '{name}'", row_idx + 2))?;
            rows.push(decoded);
        }
        Ok(Self::from_raw(name, &headers, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column_index(name).map(|idx| self.kinds[idx])
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column)).and_then(|c| c.as_ref())
    }

    /// Cells of one column in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&Value>> + '_ {
        self.rows.iter().map(move |row| row.get(index).and_then(|c| c.as_ref()))
    }

    /// New dataset holding the rows accepted by `keep`, in order.
    pub fn retain_view<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        Self {
            name: self.name.clone(),
            headers: self.headers.clone(),
            kinds: self.kinds.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    pub fn head(&self, limit: usize) -> Self {
        Self {
            name: self.name.clone(),
            headers: self.headers.clone(),
            kinds: self.kinds.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    /// Projects the named columns, in the given order. Unknown names are skipped.
    pub fn select(&self, columns: &[&str]) -> Self {
        let indices = columns
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect::<Vec<_>>();
        Self {
            name: self.name.clone(),
            headers: indices.iter().map(|&i| self.headers[i].clone()).collect(),
            kinds: indices.iter().map(|&i| self.kinds[i]).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Rows with every cell present.
    pub fn drop_missing(&self) -> Self {
        self.retain_view(|row| row.iter().all(Option::is_some))
    }
}

fn unique_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(headers.len());
    for header in headers {
        let trimmed = header.trim().to_string();
        let count = seen.entry(trimmed.clone()).or_insert(0);
        if *count == 0 {
            result.push(trimmed);
        } else {
            result.push(format!("{trimmed}.{count}"));
        }
        *count += 1;
    }
    result
}
