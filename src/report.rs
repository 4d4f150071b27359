//! Dashboard views derived from the cached datasets and one [`FilterState`].
//!
//! Column names are resolved against the unfiltered sheets and the filtered
//! copies are aggregated, so a filter that removes every row still yields a
//! well-formed (empty) view. A view whose required columns cannot be resolved
//! becomes a notice instead of an error. Sheets that failed to load are
//! named as warnings on every view that reads them.

use chrono::NaiveDate;
use itertools::Itertools;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{
        self, CellFormat, CompensationLayout, CompensationSummary, GroupOrder, PnlColumns,
        SummaryTable,
    },
    data::{ColumnKind, Value},
    dataset::Dataset,
    error::{SchemaMismatch, SourceError},
    filter::{DateRange, FilterState},
    format::format_currency,
    normalize::NumberLocale,
    resolve::{self, ColumnAliasSet},
    store::{DatasetKind, Datasets},
};

pub const PREVIEW_ROWS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Kpi,
    Filters,
    Timeline,
    TimeSeries,
    Profitability,
    CostBreakdown,
    PnlSummary,
    Allocation,
    Compensation,
}

impl ViewKind {
    pub const ALL: [ViewKind; 9] = [
        ViewKind::Kpi,
        ViewKind::Filters,
        ViewKind::Timeline,
        ViewKind::TimeSeries,
        ViewKind::Profitability,
        ViewKind::CostBreakdown,
        ViewKind::PnlSummary,
        ViewKind::Allocation,
        ViewKind::Compensation,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Kpi => "Key Metrics",
            ViewKind::Filters => "Filter Options",
            ViewKind::Timeline => "Project Timeline",
            ViewKind::TimeSeries => "Time Series Analysis",
            ViewKind::Profitability => "Project Profitability Matrix",
            ViewKind::CostBreakdown => "Cost Breakdown by Team",
            ViewKind::PnlSummary => "Project P&L Summary",
            ViewKind::Allocation => "Employee Cost Allocation",
            ViewKind::Compensation => "Employee Compensation & Benefit Structure",
        }
    }

    /// Sheets the view reads.
    pub fn sources(&self) -> &'static [DatasetKind] {
        match self {
            ViewKind::Kpi => &[DatasetKind::ProjectPnl, DatasetKind::Employees],
            ViewKind::Filters
            | ViewKind::TimeSeries
            | ViewKind::Profitability
            | ViewKind::PnlSummary => &[DatasetKind::ProjectPnl],
            ViewKind::Timeline => &[DatasetKind::Projects],
            ViewKind::CostBreakdown => &[DatasetKind::ManpowerCost],
            ViewKind::Allocation => &[DatasetKind::ManpowerAllocation],
            ViewKind::Compensation => &[DatasetKind::SalaryGrowth],
        }
    }
}

/// Presentation-ready output of one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub title: &'static str,
    pub metrics: Vec<(String, String)>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// The last row is a grand total.
    pub has_grand_total: bool,
    pub notice: Option<String>,
    /// Load failures of the sheets behind this view.
    pub warnings: Vec<String>,
}

impl RenderedView {
    fn new(kind: ViewKind) -> Self {
        Self {
            title: kind.title(),
            metrics: Vec::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            has_grand_total: false,
            notice: None,
            warnings: Vec::new(),
        }
    }

    fn notice(kind: ViewKind, message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            ..Self::new(kind)
        }
    }

    fn table(kind: ViewKind, table: &SummaryTable, locale: &NumberLocale) -> Self {
        Self {
            headers: table.headers.clone(),
            rows: table.render(locale),
            has_grand_total: true,
            ..Self::new(kind)
        }
    }
}

/// The four sheets the filter applies to, after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredDatasets {
    pub project_pnl: Dataset,
    pub manpower_cost: Dataset,
    pub manpower_allocation: Dataset,
    pub salary_growth: Dataset,
}

impl FilteredDatasets {
    pub fn apply(datasets: &Datasets, filters: &FilterState) -> Self {
        let filter = |dataset: &Dataset, period: ColumnAliasSet| {
            filters.apply(dataset, period.resolve(dataset))
        };
        Self {
            project_pnl: filter(&datasets.project_pnl, resolve::PNL_PERIOD),
            manpower_cost: filter(&datasets.manpower_cost, resolve::ALLOCATION_PERIOD),
            manpower_allocation: filter(&datasets.manpower_allocation, resolve::ALLOCATION_PERIOD),
            salary_growth: filter(&datasets.salary_growth, resolve::GROWTH_PERIOD),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_pnl: Decimal,
    pub active_employees: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub projects: Vec<String>,
    pub categories: Vec<String>,
    pub statuses: Vec<String>,
    pub date_bounds: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub project: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompensationView {
    Rollup(CompensationSummary),
    /// No rollup possible; the first filtered rows as loaded.
    Preview(Dataset),
    Empty,
}

pub struct Report<'a> {
    datasets: &'a Datasets,
    filtered: FilteredDatasets,
    locale: &'a NumberLocale,
    warnings: Vec<(DatasetKind, String)>,
}

impl<'a> Report<'a> {
    pub fn new(datasets: &'a Datasets, filters: &FilterState, locale: &'a NumberLocale) -> Self {
        debug!("Deriving report for {filters:?}");
        Self {
            datasets,
            filtered: FilteredDatasets::apply(datasets, filters),
            locale,
            warnings: Vec::new(),
        }
    }

    /// Attaches load failures so views reading those sheets report them.
    #[must_use]
    pub fn with_warnings(self, warnings: &[SourceError]) -> Self {
        Self {
            warnings: warnings
                .iter()
                .map(|warning| (warning.dataset, warning.to_string()))
                .collect(),
            ..self
        }
    }

    /// The dashboard cannot show anything meaningful without the P&L sheet.
    pub fn blocking_notice(&self) -> Option<&'static str> {
        self.datasets
            .project_pnl
            .is_empty()
            .then_some("Unable to load data. Make sure the P&L sheet is available.")
    }

    pub fn kpis(&self) -> Kpis {
        let pnl = &self.datasets.project_pnl;
        let filtered = &self.filtered.project_pnl;
        Kpis {
            total_revenue: aggregate::sum_column(filtered, resolve::REVENUE.resolve(pnl)),
            total_cost: aggregate::sum_column(filtered, resolve::MANPOWER_COST.resolve(pnl)),
            total_pnl: aggregate::sum_column(filtered, resolve::PNL.resolve(pnl)),
            active_employees: self.datasets.employees.len(),
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        let pnl = &self.datasets.project_pnl;
        let distinct = |set: ColumnAliasSet| {
            set.resolve(pnl)
                .and_then(|name| pnl.column_index(name))
                .map(|idx| {
                    pnl.column(idx)
                        .flatten()
                        .map(Value::as_display)
                        .sorted()
                        .dedup()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        let date_bounds = resolve::PNL_PERIOD
            .resolve(pnl)
            .and_then(|name| pnl.column_index(name))
            .filter(|&idx| pnl.kinds[idx] == ColumnKind::Date)
            .and_then(|idx| {
                pnl.column(idx)
                    .filter_map(|cell| cell.and_then(Value::as_date))
                    .minmax()
                    .into_option()
            })
            .map(|(min, max)| DateRange::new(min, max));
        FilterOptions {
            projects: distinct(resolve::PROJECT_NAME),
            categories: distinct(resolve::CATEGORY),
            statuses: distinct(resolve::STATUS),
            date_bounds,
        }
    }

    pub fn timeline(&self) -> Result<Vec<TimelineEntry>, SchemaMismatch> {
        let projects = &self.datasets.projects;
        let (Some(project), Some(start), Some(end)) = (
            resolve::PROJECT_NAME.resolve(projects),
            resolve::START_DATE.resolve(projects),
            resolve::END_DATE.resolve(projects),
        ) else {
            return Err(missing("timeline", projects, &[
                resolve::PROJECT_NAME,
                resolve::START_DATE,
                resolve::END_DATE,
            ]));
        };
        let selected = projects.select(&[project, start, end]).drop_missing();
        let entries = selected
            .rows
            .iter()
            .filter_map(|row| {
                let start = row[1].as_ref()?.as_date()?;
                let end = row[2].as_ref()?.as_date()?;
                Some(TimelineEntry {
                    project: row[0].as_ref()?.as_display(),
                    start,
                    end,
                    duration_days: (end - start).num_days(),
                })
            })
            .sorted_by_key(|entry| entry.start)
            .collect();
        Ok(entries)
    }

    pub fn time_series(&self) -> Result<SummaryTable, SchemaMismatch> {
        let pnl = &self.datasets.project_pnl;
        let sets = [resolve::PNL_PERIOD, resolve::REVENUE, resolve::MANPOWER_COST, resolve::PNL];
        let resolved = sets.iter().map(|set| set.resolve(pnl)).collect::<Option<Vec<_>>>();
        let Some(columns) = resolved else {
            return Err(missing("time series", pnl, &sets));
        };
        aggregate::time_series(
            &self.filtered.project_pnl,
            columns[0],
            columns[1],
            columns[2],
            columns[3],
        )
        .ok_or_else(|| missing("time series", pnl, &sets))
    }

    pub fn profitability(&self) -> Result<Dataset, SchemaMismatch> {
        let pnl = &self.datasets.project_pnl;
        let sets = [
            resolve::PROJECT_NAME,
            resolve::PNL,
            resolve::REVENUE,
            resolve::MANPOWER_COST,
            resolve::STATUS,
        ];
        let resolved = sets.iter().map(|set| set.resolve(pnl)).collect::<Option<Vec<_>>>();
        let Some(columns) = resolved else {
            return Err(missing("profitability matrix", pnl, &sets));
        };
        Ok(self.filtered.project_pnl.select(&columns).drop_missing())
    }

    pub fn cost_breakdown(&self) -> Result<SummaryTable, SchemaMismatch> {
        let cost = &self.datasets.manpower_cost;
        let sets = [resolve::TEAM, resolve::COST];
        let (Some(team), Some(amount)) = (resolve::TEAM.resolve(cost), resolve::COST.resolve(cost))
        else {
            return Err(missing("cost breakdown", cost, &sets));
        };
        aggregate::grouped_sum(
            &self.filtered.manpower_cost,
            team,
            &[amount],
            GroupOrder::FirstMeasureDescending,
        )
        .ok_or_else(|| missing("cost breakdown", cost, &sets))
    }

    pub fn pnl_summary(&self) -> Result<SummaryTable, SchemaMismatch> {
        let columns = PnlColumns::detect(&self.datasets.project_pnl)?;
        Ok(aggregate::pnl_summary(&self.filtered.project_pnl, &columns))
    }

    pub fn allocation(&self) -> Result<Dataset, SchemaMismatch> {
        let allocation = &self.datasets.manpower_allocation;
        if resolve::EMPLOYEE_NAME.resolve(allocation).is_none() {
            return Err(missing("allocation table", allocation, &[resolve::EMPLOYEE_NAME]));
        }
        Ok(self.filtered.manpower_allocation.head(PREVIEW_ROWS))
    }

    pub fn compensation(&self) -> CompensationView {
        let filtered = &self.filtered.salary_growth;
        match CompensationLayout::detect(&self.datasets.salary_growth) {
            Ok(layout) => {
                CompensationView::Rollup(aggregate::compensation_rollup(filtered, &layout))
            }
            Err(err) if !filtered.is_empty() => {
                debug!("Compensation rollup unavailable: {err}");
                CompensationView::Preview(filtered.head(PREVIEW_ROWS))
            }
            Err(_) => CompensationView::Empty,
        }
    }

    pub fn render(&self, kind: ViewKind) -> RenderedView {
        let mut view = match kind {
            ViewKind::Kpi => self.render_kpis(),
            ViewKind::Filters => self.render_filter_options(),
            ViewKind::Timeline => match self.timeline() {
                Ok(entries) if entries.is_empty() => {
                    RenderedView::notice(kind, "No timeline data available")
                }
                Ok(entries) => RenderedView {
                    headers: ["Project", "Start", "End", "Duration (days)"]
                        .map(str::to_string)
                        .to_vec(),
                    rows: entries
                        .into_iter()
                        .map(|e| {
                            vec![
                                e.project,
                                e.start.format("%Y-%m-%d").to_string(),
                                e.end.format("%Y-%m-%d").to_string(),
                                e.duration_days.to_string(),
                            ]
                        })
                        .collect(),
                    ..RenderedView::new(kind)
                },
                Err(err) => RenderedView::notice(kind, err.to_string()),
            },
            ViewKind::TimeSeries => self.render_table_view(kind, self.time_series()),
            ViewKind::Profitability => match self.profitability() {
                Ok(dataset) if dataset.is_empty() => {
                    RenderedView::notice(kind, "No profitability data available")
                }
                Ok(dataset) => self.render_dataset(kind, &dataset),
                Err(err) => RenderedView::notice(kind, err.to_string()),
            },
            ViewKind::CostBreakdown => self.render_table_view(kind, self.cost_breakdown()),
            ViewKind::PnlSummary => self.render_table_view(kind, self.pnl_summary()),
            ViewKind::Allocation => match self.allocation() {
                Ok(dataset) if dataset.is_empty() => {
                    RenderedView::notice(kind, "No allocation data available")
                }
                Ok(dataset) => self.render_dataset(kind, &dataset),
                Err(err) => RenderedView::notice(kind, err.to_string()),
            },
            ViewKind::Compensation => match self.compensation() {
                CompensationView::Rollup(summary) => self.render_compensation(kind, &summary),
                CompensationView::Preview(dataset) => self.render_dataset(kind, &dataset),
                CompensationView::Empty => {
                    RenderedView::notice(kind, "No compensation data available")
                }
            },
        };
        view.warnings = self
            .warnings
            .iter()
            .filter(|(dataset, _)| kind.sources().contains(dataset))
            .map(|(_, message)| message.clone())
            .collect();
        if let Some(notice) = &view.notice {
            info!("{}: {notice}", view.title);
        }
        view
    }

    fn render_table_view(
        &self,
        kind: ViewKind,
        table: Result<SummaryTable, SchemaMismatch>,
    ) -> RenderedView {
        match table {
            Ok(table) => RenderedView::table(kind, &table, self.locale),
            Err(err) => RenderedView::notice(kind, err.to_string()),
        }
    }

    fn render_kpis(&self) -> RenderedView {
        let kpis = self.kpis();
        let currency = |value: Decimal| format_currency(Some(value), self.locale);
        RenderedView {
            metrics: vec![
                ("Total Revenue".to_string(), currency(kpis.total_revenue)),
                ("Total Man Power Cost".to_string(), currency(kpis.total_cost)),
                ("Total P&L".to_string(), currency(kpis.total_pnl)),
                ("Active Employees".to_string(), kpis.active_employees.to_string()),
            ],
            notice: self.blocking_notice().map(str::to_string),
            ..RenderedView::new(ViewKind::Kpi)
        }
    }

    fn render_filter_options(&self) -> RenderedView {
        let options = self.filter_options();
        let mut metrics = vec![
            ("Projects".to_string(), options.projects.join(", ")),
            ("Categories".to_string(), options.categories.join(", ")),
            ("Status".to_string(), options.statuses.join(", ")),
        ];
        if let Some(bounds) = options.date_bounds {
            metrics.push((
                "Date Range".to_string(),
                format!("{} to {}", bounds.start(), bounds.end()),
            ));
        }
        RenderedView {
            metrics,
            ..RenderedView::new(ViewKind::Filters)
        }
    }

    fn render_compensation(&self, kind: ViewKind, summary: &CompensationSummary) -> RenderedView {
        let mut metrics = vec![("Unique Employees".to_string(), summary.employees.to_string())];
        if let Some(total_cost) = summary.total_cost {
            metrics.push((
                "Total Compensation Cost".to_string(),
                format_currency(Some(total_cost), self.locale),
            ));
        }
        if let Some(average) = summary.average_salary {
            metrics.push((
                "Average Salary".to_string(),
                format_currency(Some(average), self.locale),
            ));
        }
        RenderedView {
            metrics,
            ..RenderedView::table(kind, &summary.table, self.locale)
        }
    }

    fn render_dataset(&self, kind: ViewKind, dataset: &Dataset) -> RenderedView {
        let formats = dataset
            .kinds
            .iter()
            .map(|kind| match kind {
                ColumnKind::Date => CellFormat::Date,
                ColumnKind::Number => CellFormat::Plain,
                ColumnKind::Text => CellFormat::Text,
            })
            .collect::<Vec<_>>();
        RenderedView {
            headers: dataset.headers.clone(),
            rows: dataset
                .rows
                .iter()
                .map(|row| aggregate::render_row(row, &formats, self.locale))
                .collect(),
            ..RenderedView::new(kind)
        }
    }
}

fn missing(view: &'static str, dataset: &Dataset, sets: &[ColumnAliasSet]) -> SchemaMismatch {
    SchemaMismatch::new(
        view,
        sets.iter()
            .filter(|set| set.resolve(dataset).is_none())
            .map(|set| set.field)
            .collect(),
    )
}
