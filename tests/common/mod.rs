#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use manpower_ledger::store::{DatasetKind, Datasets};
use manpower_ledger::dataset::Dataset;
use manpower_ledger::normalize::Normalizer;
use tempfile::{TempDir, tempdir};

pub const EMPLOYEES: &str = "\
Employee Name,Team,Join Date
Ana,Dev,2022-03-01
Budi,Ops,2023-07-15
Cici,Dev,2024-01-02
";

pub const SALARY_GROWTH: &str = "\
Growth Month,Employee Name,Employee_id,Role,Team,Current Salary,Total Cost,Growth %
2024-01,Ana,E1,Engineer,Dev,Rp 10.000.000,Rp 12.000.000,5%
2024-06,Ana,E1,Engineer,Dev,Rp 11.000.000,Rp 13.000.000,10%
2024-01,Budi,E2,Analyst,Ops,Rp 8.000.000,Rp 9.000.000,0%
";

pub const PROJECTS: &str = "\
Project Name,Start Date,End Date
Beta,2024-02-01,2024-03-01
Alpha,2024-01-01,2024-01-31
Gamma,,2024-05-01
";

pub const MANPOWER_COST: &str = "\
Month_Key,Project Name,Team,Cost
2024-01,Alpha,Ops,Rp 100.000
2024-01,Alpha,Dev,Rp 300.000
2024-02,Beta,Dev,Rp 200.000
";

pub const MANPOWER_ALLOCATION: &str = "\
Month_Key,Employee Name,Project Name,Allocation
2024-01,Ana,Alpha,50%
2024-02,Budi,Beta,100%
";

pub const PROJECT_PNL: &str = "\
Month,Project Name,Category,Status,Revenue,Man Power Cost,PnL,Margin
2024-01,Alpha,Internal,Profitable,Rp 1.000.000,Rp 600.000,Rp 400.000,40%
2024-02,Alpha,Internal,Profitable,Rp 1.500.000,Rp 700.000,Rp 800.000,\"53,33%\"
2024-02,Beta,Client,Loss,Rp 500.000,Rp 900.000,Rp -400.000,-80%
";

pub fn sample_sheet(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::Employees => EMPLOYEES,
        DatasetKind::SalaryGrowth => SALARY_GROWTH,
        DatasetKind::Projects => PROJECTS,
        DatasetKind::ManpowerCost => MANPOWER_COST,
        DatasetKind::ManpowerAllocation => MANPOWER_ALLOCATION,
        DatasetKind::ProjectPnl => PROJECT_PNL,
    }
}

/// Parses `contents` as a comma-separated sheet without normalizing it.
pub fn raw_dataset(kind: DatasetKind, contents: &str) -> Dataset {
    Dataset::read_delimited(
        kind.sheet_name(),
        contents.as_bytes(),
        b',',
        encoding_rs::UTF_8,
    )
    .expect("parse sample sheet")
}

/// Every sample sheet, normalized with the default locale.
pub fn sample_datasets() -> Datasets {
    let normalizer = Normalizer::default();
    let sheet = |kind| normalizer.normalize_dataset(raw_dataset(kind, sample_sheet(kind)));
    Datasets {
        employees: sheet(DatasetKind::Employees),
        salary_growth: sheet(DatasetKind::SalaryGrowth),
        projects: sheet(DatasetKind::Projects),
        manpower_cost: sheet(DatasetKind::ManpowerCost),
        manpower_allocation: sheet(DatasetKind::ManpowerAllocation),
        project_pnl: sheet(DatasetKind::ProjectPnl),
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Workspace holding every sample sheet under its default file name.
    pub fn with_sample_sheets() -> Self {
        let workspace = Self::new();
        for kind in DatasetKind::ALL {
            workspace.write(&kind.default_file_name(), sample_sheet(kind));
        }
        workspace
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
