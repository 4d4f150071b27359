use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    data::parse_naive_date,
    filter::{DateRange, FilterState},
    report::ViewKind,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Manpower cost, P&L and compensation views over exported HR sheets",
    long_about = None
)]
pub struct Cli {
    /// YAML manifest describing the sheet files, locale and cache window
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the sheet files (overrides the manifest)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
    #[command(flatten)]
    pub filters: FilterArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Total revenue, man power cost, P&L and active employees
    Kpi,
    /// Projects with start and end dates, ordered by start
    Timeline,
    /// Revenue, cost and P&L per month with a grand total
    TimeSeries,
    /// Project P&L against revenue and cost, with status
    Profitability,
    /// Manpower cost per team, largest first
    CostBreakdown,
    /// Per-project P&L summary with a grand total
    PnlSummary,
    /// First rows of the employee cost allocation sheet
    Allocation,
    /// Per-employee compensation rollup with grand totals
    Compensation,
    /// Selectable projects, categories, statuses and the P&L date bounds
    Filters,
    /// Every view in sequence
    Dashboard,
}

impl Commands {
    pub fn views(&self) -> Vec<ViewKind> {
        match self {
            Commands::Kpi => vec![ViewKind::Kpi],
            Commands::Timeline => vec![ViewKind::Timeline],
            Commands::TimeSeries => vec![ViewKind::TimeSeries],
            Commands::Profitability => vec![ViewKind::Profitability],
            Commands::CostBreakdown => vec![ViewKind::CostBreakdown],
            Commands::PnlSummary => vec![ViewKind::PnlSummary],
            Commands::Allocation => vec![ViewKind::Allocation],
            Commands::Compensation => vec![ViewKind::Compensation],
            Commands::Filters => vec![ViewKind::Filters],
            Commands::Dashboard => ViewKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// First day of the date range (inclusive)
    #[arg(long, value_parser = parse_date, global = true)]
    pub from: Option<NaiveDate>,
    /// Last day of the date range (inclusive)
    #[arg(long, value_parser = parse_date, global = true)]
    pub to: Option<NaiveDate>,
    /// Keep only rows for this project
    #[arg(long, global = true)]
    pub project: Option<String>,
    /// Keep only rows for this team
    #[arg(long, global = true)]
    pub team: Option<String>,
    /// Keep only rows in this category
    #[arg(long, global = true)]
    pub category: Option<String>,
    /// Keep only rows with this status
    #[arg(long, global = true)]
    pub status: Option<String>,
}

impl FilterArgs {
    /// A single bound extends the range to the other end of the calendar.
    pub fn to_state(&self) -> FilterState {
        let date_range = match (self.from, self.to) {
            (None, None) => None,
            (from, to) => Some(DateRange::new(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )),
        };
        FilterState::default()
            .with_date_range(date_range)
            .with_project(self.project.clone())
            .with_team(self.team.clone())
            .with_category(self.category.clone())
            .with_status(self.status.clone())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_naive_date(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_filters_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "manpower-ledger",
            "kpi",
            "--project",
            "Alpha",
            "--from",
            "2024-01-01",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Kpi));
        assert_eq!(cli.format, OutputFormat::Json);
        let state = cli.filters.to_state();
        assert_eq!(state.project.as_deref(), Some("Alpha"));
        let range = state.date_range.unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::MAX);
    }

    #[test]
    fn no_selectors_means_unrestricted() {
        let cli = Cli::try_parse_from(["manpower-ledger", "dashboard"]).unwrap();
        assert!(cli.filters.to_state().is_unrestricted());
        assert_eq!(cli.command.views().len(), ViewKind::ALL.len());
    }

    #[test]
    fn invalid_dates_are_rejected() {
        let result = Cli::try_parse_from(["manpower-ledger", "kpi", "--to", "not-a-date"]);
        assert!(result.is_err());
    }
}
