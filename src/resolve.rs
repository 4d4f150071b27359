//! Alias-tolerant column lookup.
//!
//! The same logical field is spelled differently across the exported sheets
//! (`Month`, `month`, `Date`). A [`ColumnAliasSet`] lists the accepted
//! spellings in priority order; resolution is case-insensitive, the first
//! candidate present wins, and an unmatched set resolves to `None`.

use crate::dataset::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAliasSet {
    pub field: &'static str,
    pub candidates: &'static [&'static str],
}

impl ColumnAliasSet {
    pub const fn new(field: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { field, candidates }
    }

    pub fn resolve<'a>(&self, dataset: &'a Dataset) -> Option<&'a str> {
        resolve(dataset, self.candidates)
    }
}

pub const PNL_PERIOD: ColumnAliasSet = ColumnAliasSet::new("period", &["Month", "month", "Date"]);
pub const REVENUE: ColumnAliasSet = ColumnAliasSet::new("revenue", &["Revenue", "revenue"]);
pub const MANPOWER_COST: ColumnAliasSet = ColumnAliasSet::new(
    "man power cost",
    &["Man Power Cost", "man power cost", "Cost", "cost"],
);
pub const PNL: ColumnAliasSet = ColumnAliasSet::new("P&L", &["PnL", "pnl", "P&L"]);
pub const PROJECT_NAME: ColumnAliasSet =
    ColumnAliasSet::new("project name", &["Project Name", "project name"]);
pub const STATUS: ColumnAliasSet = ColumnAliasSet::new("status", &["Status", "status"]);
pub const CATEGORY: ColumnAliasSet = ColumnAliasSet::new("category", &["Category", "category"]);
pub const MARGIN: ColumnAliasSet = ColumnAliasSet::new("margin", &["Margin", "margin"]);
pub const START_DATE: ColumnAliasSet =
    ColumnAliasSet::new("start date", &["Start Date", "start date"]);
pub const END_DATE: ColumnAliasSet = ColumnAliasSet::new("end date", &["End Date", "end date"]);
pub const TEAM: ColumnAliasSet = ColumnAliasSet::new("team", &["Team", "team"]);
pub const COST: ColumnAliasSet = ColumnAliasSet::new("cost", &["Cost", "cost"]);
pub const ALLOCATION_PERIOD: ColumnAliasSet =
    ColumnAliasSet::new("period", &["Month_Key", "Month"]);
pub const GROWTH_PERIOD: ColumnAliasSet =
    ColumnAliasSet::new("period", &["Growth Month", "Month"]);
pub const EMPLOYEE_NAME: ColumnAliasSet =
    ColumnAliasSet::new("employee name", &["Employee Name", "employee name"]);
pub const EMPLOYEE_ID: ColumnAliasSet =
    ColumnAliasSet::new("employee id", &["Employee_id", "Employee Id"]);
pub const ROLE: ColumnAliasSet = ColumnAliasSet::new("role", &["Role", "role"]);
pub const TOTAL_COST: ColumnAliasSet =
    ColumnAliasSet::new("total cost", &["Total Cost", "total cost"]);
pub const CURRENT_SALARY: ColumnAliasSet = ColumnAliasSet::new(
    "current salary",
    &["Current Salary", "current salary", "Salary"],
);

/// Returns the dataset's own spelling of the first candidate it contains.
pub fn resolve<'a>(dataset: &'a Dataset, candidates: &[&str]) -> Option<&'a str> {
    if dataset.is_empty() {
        return None;
    }
    resolve_header(&dataset.headers, candidates)
}

/// Header-only lookup, usable on datasets that have been filtered down to no rows.
pub fn resolve_header<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .find(|header| header.eq_ignore_ascii_case(candidate))
            .map(String::as_str)
    })
}
