use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    data::{ColumnKind, Value},
    dataset::Dataset,
};

pub const PROJECT_COLUMN: &str = "Project Name";
pub const TEAM_COLUMN: &str = "Team";
pub const CATEGORY_COLUMN: &str = "Category";
pub const STATUS_COLUMN: &str = "Status";

/// Inclusive calendar range. Bounds are stored ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DateBounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct DateBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl From<DateBounds> for DateRange {
    fn from(bounds: DateBounds) -> Self {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// User selection applied to every dataset. Setters return a new state; an
/// unset dimension places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_range: Option<DateRange>,
    pub project: Option<String>,
    pub team: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl FilterState {
    #[must_use]
    pub fn with_date_range(self, date_range: Option<DateRange>) -> Self {
        Self { date_range, ..self }
    }

    #[must_use]
    pub fn with_project(self, project: Option<String>) -> Self {
        Self { project, ..self }
    }

    #[must_use]
    pub fn with_team(self, team: Option<String>) -> Self {
        Self { team, ..self }
    }

    #[must_use]
    pub fn with_category(self, category: Option<String>) -> Self {
        Self { category, ..self }
    }

    #[must_use]
    pub fn with_status(self, status: Option<String>) -> Self {
        Self { status, ..self }
    }

    #[must_use]
    pub fn reset(&self) -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    fn dimension_selectors(&self) -> [(&'static str, Option<&str>); 4] {
        [
            (PROJECT_COLUMN, self.project.as_deref()),
            (TEAM_COLUMN, self.team.as_deref()),
            (CATEGORY_COLUMN, self.category.as_deref()),
            (STATUS_COLUMN, self.status.as_deref()),
        ]
    }

    /// Returns the records of `dataset` that satisfy every active selector
    /// with a matching column. The input is left untouched.
    pub fn apply(&self, dataset: &Dataset, date_column: Option<&str>) -> Dataset {
        if dataset.is_empty() {
            return dataset.clone();
        }

        let date_predicate = match (self.date_range, date_column) {
            (Some(range), Some(column)) => match dataset.column_index(column) {
                Some(idx) if dataset.kinds[idx] == ColumnKind::Date => Some((idx, range)),
                Some(_) => {
                    debug!(
                        "Skipping date filter on '{}': column '{column}' is not date-typed",
                        dataset.name
                    );
                    None
                }
                None => None,
            },
            _ => None,
        };

        let dimension_predicates = self
            .dimension_selectors()
            .into_iter()
            .filter_map(|(column, selected)| {
                let selected = selected?;
                dataset.column_index(column).map(|idx| (idx, selected))
            })
            .collect::<Vec<_>>();

        if date_predicate.is_none() && dimension_predicates.is_empty() {
            return dataset.clone();
        }

        let filtered = dataset.retain_view(|row| {
            let date_ok = date_predicate.is_none_or(|(idx, range)| {
                matches!(&row[idx], Some(Value::Date(d)) if range.contains(*d))
            });
            date_ok
                && dimension_predicates.iter().all(|(idx, selected)| {
                    matches!(&row[*idx], Some(Value::Text(s)) if s.as_str() == *selected)
                })
        });
        debug!(
            "Filtered '{}' from {} to {} row(s)",
            dataset.name,
            dataset.len(),
            filtered.len()
        );
        filtered
    }
}
