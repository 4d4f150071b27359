//! Grouped sums, P&L summaries and compensation rollups.
//!
//! Every table produced here is a [`SummaryTable`]: the grouped or projected
//! rows plus one trailing grand-total record. Numeric grand totals are sums
//! over the non-total rows (missing cells count as zero in those sums only);
//! text columns of the total describe cardinality instead (`3 Categories`).
//!
//! The compensation rollup runs in two stages. Stage one collapses the salary
//! history to one row per employee by taking the maximum of every numeric
//! column. Stage two sums those maxima, except for percentage-like columns,
//! whose total is the average across employees.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    data::{ColumnKind, Value},
    dataset::{Cell, Dataset, Row},
    error::SchemaMismatch,
    format::{format_currency, format_percent},
    normalize::NumberLocale,
    resolve::{self, resolve_header},
};

pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL";

/// How a column is rendered for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    Text,
    Date,
    Currency,
    Percent,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub formats: Vec<CellFormat>,
    pub rows: Vec<Row>,
    pub grand_total: Row,
}

impl SummaryTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Numeric value of the grand-total record for `name`.
    pub fn total(&self, name: &str) -> Option<Decimal> {
        let idx = self.column_index(name)?;
        self.grand_total.get(idx)?.as_ref()?.as_number()
    }

    /// Cell of a non-total row.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    /// Renders every row, the grand total last, as display strings.
    pub fn render(&self, locale: &NumberLocale) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .chain(std::iter::once(&self.grand_total))
            .map(|row| render_row(row, &self.formats, locale))
            .collect()
    }
}

pub fn render_row(row: &[Cell], formats: &[CellFormat], locale: &NumberLocale) -> Vec<String> {
    row.iter()
        .zip(formats)
        .map(|(cell, format)| render_cell(cell.as_ref(), *format, locale))
        .collect()
}

pub fn render_cell(cell: Option<&Value>, format: CellFormat, locale: &NumberLocale) -> String {
    match (cell, format) {
        (Some(Value::Number(n)), CellFormat::Currency) => format_currency(Some(*n), locale),
        (Some(Value::Number(n)), CellFormat::Percent) => format_percent(Some(*n)),
        (Some(value), _) => value.as_display(),
        (None, CellFormat::Currency) => format_currency(None, locale),
        (None, CellFormat::Percent) => format_percent(None),
        (None, _) => String::new(),
    }
}

/// Sum of one numeric column. An absent column or an empty dataset is zero.
/// Sums that leave the `Decimal` range clamp to its bounds.
pub fn sum_column(dataset: &Dataset, column: Option<&str>) -> Decimal {
    let Some(idx) = column.and_then(|name| dataset.column_index(name)) else {
        return Decimal::ZERO;
    };
    dataset
        .column(idx)
        .filter_map(|cell| cell.and_then(Value::as_number))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `sum / count`, zero when there is nothing to average.
fn mean(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    sum.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO)
}

/// `part / whole * 100`, zero unless `whole` is positive. Clamps on overflow.
fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let clamped = if part.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    };
    part.checked_div(whole)
        .map_or(clamped, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    KeyAscending,
    /// Descending by the first measure.
    FirstMeasureDescending,
}

/// Groups by `key`, summing each measure. Records without a key are dropped.
pub fn grouped_sum(
    dataset: &Dataset,
    key: &str,
    measures: &[&str],
    order: GroupOrder,
) -> Option<SummaryTable> {
    let key_idx = dataset.column_index(key)?;
    let measure_idx = measures
        .iter()
        .map(|m| dataset.column_index(m))
        .collect::<Option<Vec<_>>>()?;

    let mut groups: BTreeMap<Value, Vec<Decimal>> = BTreeMap::new();
    for row in &dataset.rows {
        let Some(key_value) = row[key_idx].clone() else {
            continue;
        };
        let sums = groups
            .entry(key_value)
            .or_insert_with(|| vec![Decimal::ZERO; measure_idx.len()]);
        for (sum, &idx) in sums.iter_mut().zip(&measure_idx) {
            if let Some(n) = row[idx].as_ref().and_then(Value::as_number) {
                *sum = sum.saturating_add(n);
            }
        }
    }

    let mut grouped = groups.into_iter().collect::<Vec<_>>();
    if order == GroupOrder::FirstMeasureDescending {
        grouped.sort_by(|a, b| b.1.first().cmp(&a.1.first()));
    }

    let mut totals = vec![Decimal::ZERO; measure_idx.len()];
    let rows = grouped
        .into_iter()
        .map(|(key_value, sums)| {
            for (total, sum) in totals.iter_mut().zip(&sums) {
                *total = total.saturating_add(*sum);
            }
            std::iter::once(Some(key_value))
                .chain(sums.into_iter().map(|s| Some(Value::Number(s))))
                .collect::<Row>()
        })
        .collect::<Vec<_>>();

    let key_format = match dataset.kinds[key_idx] {
        ColumnKind::Date => CellFormat::Date,
        _ => CellFormat::Text,
    };
    let grand_total = std::iter::once(Some(Value::Text(GRAND_TOTAL_LABEL.to_string())))
        .chain(totals.into_iter().map(|t| Some(Value::Number(t))))
        .collect();

    Some(SummaryTable {
        headers: std::iter::once(key)
            .chain(measures.iter().copied())
            .map(str::to_string)
            .collect(),
        formats: std::iter::once(key_format)
            .chain(std::iter::repeat_n(CellFormat::Currency, measures.len()))
            .collect(),
        rows,
        grand_total,
    })
}

/// Revenue, cost and P&L per period, earliest period first.
pub fn time_series(
    dataset: &Dataset,
    period: &str,
    revenue: &str,
    cost: &str,
    pnl: &str,
) -> Option<SummaryTable> {
    grouped_sum(dataset, period, &[revenue, cost, pnl], GroupOrder::KeyAscending)
}

/// Resolved column names of the P&L sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnlColumns {
    pub project: String,
    pub pnl: String,
    pub cost: String,
    pub revenue: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub margin: Option<String>,
}

impl PnlColumns {
    pub fn detect(dataset: &Dataset) -> Result<Self, SchemaMismatch> {
        let project = resolve::PROJECT_NAME.resolve(dataset);
        let pnl = resolve::PNL.resolve(dataset);
        let cost = resolve::MANPOWER_COST.resolve(dataset);
        let revenue = resolve::REVENUE.resolve(dataset);
        match (project, pnl, cost, revenue) {
            (Some(project), Some(pnl), Some(cost), Some(revenue)) => Ok(Self {
                project: project.to_string(),
                pnl: pnl.to_string(),
                cost: cost.to_string(),
                revenue: revenue.to_string(),
                category: resolve::CATEGORY.resolve(dataset).map(str::to_string),
                status: resolve::STATUS.resolve(dataset).map(str::to_string),
                margin: resolve::MARGIN.resolve(dataset).map(str::to_string),
            }),
            _ => Err(SchemaMismatch::new(
                "P&L summary",
                [
                    (project, resolve::PROJECT_NAME.field),
                    (pnl, resolve::PNL.field),
                    (cost, resolve::MANPOWER_COST.field),
                    (revenue, resolve::REVENUE.field),
                ]
                .into_iter()
                .filter(|(found, _)| found.is_none())
                .map(|(_, field)| field)
                .collect(),
            )),
        }
    }
}

/// Projected P&L rows with a grand total. Money columns are summed, the
/// margin total is total P&L over total revenue (zero unless revenue is
/// positive), and category/status report their distinct counts.
pub fn pnl_summary(dataset: &Dataset, columns: &PnlColumns) -> SummaryTable {
    let mut layout: Vec<(&str, CellFormat)> = vec![(columns.project.as_str(), CellFormat::Text)];
    if let Some(category) = &columns.category {
        layout.push((category.as_str(), CellFormat::Text));
    }
    if let Some(status) = &columns.status {
        layout.push((status.as_str(), CellFormat::Text));
    }
    layout.push((columns.pnl.as_str(), CellFormat::Currency));
    layout.push((columns.cost.as_str(), CellFormat::Currency));
    layout.push((columns.revenue.as_str(), CellFormat::Currency));
    if let Some(margin) = &columns.margin {
        layout.push((margin.as_str(), CellFormat::Percent));
    }

    let names = layout.iter().map(|(name, _)| *name).collect::<Vec<_>>();
    let projected = dataset.select(&names);
    let total_pnl = sum_column(&projected, Some(columns.pnl.as_str()));
    let total_revenue = sum_column(&projected, Some(columns.revenue.as_str()));

    let grand_total = names
        .iter()
        .map(|&name| {
            let value = if name == columns.project {
                Value::Text(GRAND_TOTAL_LABEL.to_string())
            } else if Some(name) == columns.category.as_deref() {
                Value::Text(format!("{} Categories", distinct_count(&projected, name)))
            } else if Some(name) == columns.status.as_deref() {
                Value::Text(format!("{} Status", distinct_count(&projected, name)))
            } else if Some(name) == columns.margin.as_deref() {
                Value::Number(ratio_percent(total_pnl, total_revenue))
            } else {
                Value::Number(sum_column(&projected, Some(name)))
            };
            Some(value)
        })
        .collect();

    SummaryTable {
        headers: projected.headers.clone(),
        formats: layout.iter().map(|(_, format)| *format).collect(),
        rows: projected.rows,
        grand_total,
    }
}

fn distinct_count(dataset: &Dataset, column: &str) -> usize {
    dataset
        .column_index(column)
        .map(|idx| dataset.column(idx).flatten().collect::<BTreeSet<_>>().len())
        .unwrap_or(0)
}

const COMPENSATION_EXCLUDED: &[&str] = &[
    "Employee Name",
    "Employee_id",
    "Employee Id",
    "Role",
    "Team",
    "Growth Month",
    "Month",
    "Date",
    "Join Date",
];

/// Percentage-like metrics average instead of summing in grand totals.
pub fn is_percentage_like(column: &str) -> bool {
    column.contains('%') || column.to_lowercase().contains("growth")
}

/// Which salary-history columns take part in the rollup. Detected from the
/// sheet's headers so it stays valid when filtering leaves no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationLayout {
    pub employee: String,
    pub employee_id: Option<String>,
    pub role: Option<String>,
    pub team: Option<String>,
    pub numeric: Vec<String>,
}

impl CompensationLayout {
    pub fn detect(dataset: &Dataset) -> Result<Self, SchemaMismatch> {
        let employee = resolve_header(&dataset.headers, resolve::EMPLOYEE_NAME.candidates)
            .ok_or_else(|| {
                SchemaMismatch::new("compensation", vec![resolve::EMPLOYEE_NAME.field])
            })?;
        let numeric = dataset
            .headers
            .iter()
            .zip(&dataset.kinds)
            .filter(|(name, kind)| {
                **kind == ColumnKind::Number
                    && !COMPENSATION_EXCLUDED
                        .iter()
                        .any(|excluded| excluded.eq_ignore_ascii_case(name))
            })
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        if numeric.is_empty() {
            return Err(SchemaMismatch::new(
                "compensation",
                vec!["numeric compensation columns"],
            ));
        }
        let header = |set: resolve::ColumnAliasSet| {
            resolve_header(&dataset.headers, set.candidates).map(str::to_string)
        };
        Ok(Self {
            employee: employee.to_string(),
            employee_id: header(resolve::EMPLOYEE_ID),
            role: header(resolve::ROLE),
            team: header(resolve::TEAM),
            numeric,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompensationSummary {
    pub table: SummaryTable,
    pub employees: usize,
    pub total_cost: Option<Decimal>,
    pub average_salary: Option<Decimal>,
}

#[derive(Default)]
struct EmployeeMax {
    employee_id: Option<Value>,
    role: Option<Value>,
    team: Option<Value>,
    maxima: Vec<Option<Decimal>>,
}

/// Two-stage max-then-sum rollup of salary history rows.
pub fn compensation_rollup(dataset: &Dataset, layout: &CompensationLayout) -> CompensationSummary {
    let index = |name: &Option<String>| name.as_deref().and_then(|n| dataset.column_index(n));
    let employee_idx = dataset.column_index(&layout.employee);
    let id_idx = index(&layout.employee_id);
    let role_idx = index(&layout.role);
    let team_idx = index(&layout.team);
    let numeric_idx = layout
        .numeric
        .iter()
        .map(|name| dataset.column_index(name))
        .collect::<Vec<_>>();

    // Stage 1: one row per employee holding the per-column maximum.
    let mut per_employee: BTreeMap<String, EmployeeMax> = BTreeMap::new();
    if let Some(employee_idx) = employee_idx {
        for row in &dataset.rows {
            let Some(employee) = row[employee_idx].as_ref() else {
                continue;
            };
            let entry = per_employee
                .entry(employee.as_display())
                .or_insert_with(|| EmployeeMax {
                    maxima: vec![None; numeric_idx.len()],
                    ..EmployeeMax::default()
                });
            keep_first(&mut entry.employee_id, row, id_idx);
            keep_first(&mut entry.role, row, role_idx);
            keep_first(&mut entry.team, row, team_idx);
            for (max, idx) in entry.maxima.iter_mut().zip(&numeric_idx) {
                let Some(value) = idx.and_then(|i| row[i].as_ref()).and_then(Value::as_number)
                else {
                    continue;
                };
                *max = Some(max.map_or(value, |current| current.max(value)));
            }
        }
    }

    let employees = per_employee.len();
    let mut headers = vec![layout.employee.clone()];
    let mut formats = vec![CellFormat::Text];
    for column in [&layout.employee_id, &layout.role, &layout.team].into_iter().flatten() {
        headers.push(column.clone());
        formats.push(CellFormat::Text);
    }
    for column in &layout.numeric {
        headers.push(column.clone());
        formats.push(if is_percentage_like(column) {
            CellFormat::Percent
        } else {
            CellFormat::Currency
        });
    }

    let mut roles = BTreeSet::new();
    let mut teams = BTreeSet::new();
    let mut sums = vec![Decimal::ZERO; layout.numeric.len()];
    let rows = per_employee
        .into_iter()
        .map(|(name, max)| {
            let mut row: Row = vec![Some(Value::Text(name))];
            if layout.employee_id.is_some() {
                row.push(max.employee_id);
            }
            if layout.role.is_some() {
                if let Some(role) = &max.role {
                    roles.insert(role.clone());
                }
                row.push(max.role);
            }
            if layout.team.is_some() {
                if let Some(team) = &max.team {
                    teams.insert(team.clone());
                }
                row.push(max.team);
            }
            for (sum, value) in sums.iter_mut().zip(&max.maxima) {
                *sum = sum.saturating_add(value.unwrap_or(Decimal::ZERO));
            }
            row.extend(max.maxima.into_iter().map(|m| m.map(Value::Number)));
            row
        })
        .collect::<Vec<_>>();

    // Stage 2: totals of the per-employee maxima.
    let stage_two = |column: &str, sum: Decimal| {
        if is_percentage_like(column) {
            mean(sum, employees)
        } else {
            sum
        }
    };
    let mut grand_total: Row = vec![Some(Value::Text(GRAND_TOTAL_LABEL.to_string()))];
    if layout.employee_id.is_some() {
        grand_total.push(Some(Value::Text("-".to_string())));
    }
    if layout.role.is_some() {
        grand_total.push(Some(Value::Text(format!("{} Roles", roles.len()))));
    }
    if layout.team.is_some() {
        grand_total.push(Some(Value::Text(format!("{} Teams", teams.len()))));
    }
    let totals = layout
        .numeric
        .iter()
        .zip(&sums)
        .map(|(column, sum)| stage_two(column, *sum))
        .collect::<Vec<_>>();
    grand_total.extend(totals.iter().map(|t| Some(Value::Number(*t))));

    let total_of = |set: resolve::ColumnAliasSet| {
        resolve_header(&layout.numeric, set.candidates)
            .and_then(|name| layout.numeric.iter().position(|n| n == name))
            .map(|pos| sums[pos])
    };
    let total_cost = total_of(resolve::TOTAL_COST);
    let average_salary = total_of(resolve::CURRENT_SALARY).map(|sum| mean(sum, employees));

    CompensationSummary {
        table: SummaryTable {
            headers,
            formats,
            rows,
            grand_total,
        },
        employees,
        total_cost,
        average_salary,
    }
}

fn keep_first(slot: &mut Option<Value>, row: &Row, idx: Option<usize>) {
    if slot.is_none() {
        *slot = idx.and_then(|i| row[i].clone());
    }
}
