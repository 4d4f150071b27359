//! Cached, normalized datasets.
//!
//! [`DatasetStore`] pulls the six sheets from a [`DataSource`], normalizes
//! them, and serves the result until the freshness window elapses. Each sheet
//! is loaded independently: a sheet that cannot be fetched or parsed becomes
//! an empty dataset plus a [`SourceError`] warning, and the others load as
//! usual.

use std::{
    fmt,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use encoding_rs::Encoding;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::Config,
    dataset::Dataset,
    error::SourceError,
    io_utils,
    normalize::Normalizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DatasetKind {
    Employees,
    SalaryGrowth,
    Projects,
    ManpowerCost,
    ManpowerAllocation,
    ProjectPnl,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 6] = [
        DatasetKind::Employees,
        DatasetKind::SalaryGrowth,
        DatasetKind::Projects,
        DatasetKind::ManpowerCost,
        DatasetKind::ManpowerAllocation,
        DatasetKind::ProjectPnl,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            DatasetKind::Employees => "Employees",
            DatasetKind::SalaryGrowth => "Salary_Growth",
            DatasetKind::Projects => "Projects",
            DatasetKind::ManpowerCost => "Manpower_Cost_Per_Project",
            DatasetKind::ManpowerAllocation => "Manpower_Allocation",
            DatasetKind::ProjectPnl => "Project_PnL",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("{}.csv", self.sheet_name())
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Supplies one raw, text-typed dataset per sheet.
pub trait DataSource {
    fn fetch(&self, kind: DatasetKind) -> Result<Dataset>;
}

/// Reads each sheet from a delimited file in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    paths: Vec<(DatasetKind, PathBuf)>,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
}

impl DirectorySource {
    pub fn from_config(config: &Config) -> Result<Self> {
        let delimiter = config
            .source
            .delimiter
            .as_deref()
            .map(io_utils::parse_delimiter)
            .transpose()
            .map_err(anyhow::Error::msg)?;
        let encoding = io_utils::resolve_encoding(config.source.encoding.as_deref())?;
        let paths = DatasetKind::ALL
            .iter()
            .map(|kind| (*kind, config.dataset_path(*kind)))
            .collect();
        Ok(Self {
            paths,
            delimiter,
            encoding,
        })
    }

    fn path_for(&self, kind: DatasetKind) -> Option<&PathBuf> {
        self.paths
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, path)| path)
    }
}

impl DataSource for DirectorySource {
    fn fetch(&self, kind: DatasetKind) -> Result<Dataset> {
        let path = self
            .path_for(kind)
            .ok_or_else(|| anyhow::anyhow!("No file configured for {kind}"))?;
        let bytes = io_utils::read_file_bytes(path)?;
        let delimiter = io_utils::resolve_input_delimiter(path, self.delimiter);
        Dataset::read_delimited(kind.sheet_name(), bytes.as_slice(), delimiter, self.encoding)
    }
}

/// The normalized sheets as of one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Datasets {
    pub employees: Dataset,
    pub salary_growth: Dataset,
    pub projects: Dataset,
    pub manpower_cost: Dataset,
    pub manpower_allocation: Dataset,
    pub project_pnl: Dataset,
}

impl Datasets {
    pub fn get(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Employees => &self.employees,
            DatasetKind::SalaryGrowth => &self.salary_growth,
            DatasetKind::Projects => &self.projects,
            DatasetKind::ManpowerCost => &self.manpower_cost,
            DatasetKind::ManpowerAllocation => &self.manpower_allocation,
            DatasetKind::ProjectPnl => &self.project_pnl,
        }
    }

    fn slot(&mut self, kind: DatasetKind) -> &mut Dataset {
        match kind {
            DatasetKind::Employees => &mut self.employees,
            DatasetKind::SalaryGrowth => &mut self.salary_growth,
            DatasetKind::Projects => &mut self.projects,
            DatasetKind::ManpowerCost => &mut self.manpower_cost,
            DatasetKind::ManpowerAllocation => &mut self.manpower_allocation,
            DatasetKind::ProjectPnl => &mut self.project_pnl,
        }
    }
}

#[derive(Debug)]
pub struct Snapshot {
    pub loaded_at: Instant,
    pub datasets: Datasets,
    pub warnings: Vec<SourceError>,
}

pub struct DatasetStore<S> {
    source: S,
    normalizer: Normalizer,
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

impl<S: DataSource> DatasetStore<S> {
    pub fn new(source: S, normalizer: Normalizer, ttl: Duration) -> Self {
        Self {
            source,
            normalizer,
            ttl,
            snapshot: None,
        }
    }

    /// Current snapshot, reloading when none exists or it has gone stale.
    pub fn snapshot(&mut self) -> &Snapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&mut self, now: Instant) -> &Snapshot {
        let fresh = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| now.saturating_duration_since(snapshot.loaded_at) < self.ttl);
        if fresh {
            debug!("Serving cached datasets");
        } else {
            self.snapshot = Some(self.load(now));
        }
        self.snapshot
            .get_or_insert_with(|| Snapshot {
                loaded_at: now,
                datasets: Datasets::default(),
                warnings: Vec::new(),
            })
    }

    /// Drops the cached snapshot so the next access reloads.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    fn load(&self, now: Instant) -> Snapshot {
        let mut datasets = Datasets::default();
        let mut warnings = Vec::new();
        for kind in DatasetKind::ALL {
            match self.source.fetch(kind) {
                Ok(raw) => {
                    let normalized = self.normalizer.normalize_dataset(raw);
                    info!("Loaded {} row(s) from {kind}", normalized.len());
                    *datasets.slot(kind) = normalized;
                }
                Err(reason) => {
                    let error = SourceError {
                        dataset: kind,
                        reason,
                    };
                    warn!("{error}");
                    *datasets.slot(kind) = Dataset::empty(kind.sheet_name());
                    warnings.push(error);
                }
            }
        }
        Snapshot {
            loaded_at: now,
            datasets,
            warnings,
        }
    }
}
