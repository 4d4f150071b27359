//! YAML manifest describing where the exported sheets live and how to read them.
//!
//! Every field has a default, so an empty manifest (or none at all) reads the
//! six sheets as `<Sheet>.csv` from the working directory with Rupiah number
//! formatting and a ten minute freshness window.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{io_utils, normalize::NumberLocale, store::DatasetKind};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub datasets: DatasetFiles,
    pub cache_ttl_secs: u64,
    pub locale: NumberLocale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            datasets: DatasetFiles::default(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            locale: NumberLocale::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub directory: PathBuf,
    pub delimiter: Option<String>,
    pub encoding: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            delimiter: None,
            encoding: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub employees: String,
    pub salary_growth: String,
    pub projects: String,
    pub manpower_cost: String,
    pub manpower_allocation: String,
    pub project_pnl: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            employees: DatasetKind::Employees.default_file_name(),
            salary_growth: DatasetKind::SalaryGrowth.default_file_name(),
            projects: DatasetKind::Projects.default_file_name(),
            manpower_cost: DatasetKind::ManpowerCost.default_file_name(),
            manpower_allocation: DatasetKind::ManpowerAllocation.default_file_name(),
            project_pnl: DatasetKind::ProjectPnl.default_file_name(),
        }
    }
}

impl DatasetFiles {
    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Employees => &self.employees,
            DatasetKind::SalaryGrowth => &self.salary_growth,
            DatasetKind::Projects => &self.projects,
            DatasetKind::ManpowerCost => &self.manpower_cost,
            DatasetKind::ManpowerAllocation => &self.manpower_allocation,
            DatasetKind::ProjectPnl => &self.project_pnl,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(label) = &self.source.delimiter {
            io_utils::parse_delimiter(label).map_err(anyhow::Error::msg)?;
        }
        io_utils::resolve_encoding(self.source.encoding.as_deref())?;
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn dataset_path(&self, kind: DatasetKind) -> PathBuf {
        self.source.directory.join(self.datasets.file_name(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(
            config.dataset_path(DatasetKind::ProjectPnl),
            PathBuf::from("./Project_PnL.csv")
        );
    }

    #[test]
    fn partial_manifest_overrides_selected_fields() {
        let raw = "\
source:
  directory: /srv/sheets
  delimiter: semicolon
cache_ttl_secs: 30
locale:
  currency_marker: IDR
datasets:
  projects: registry.csv
";
        let config = Config::from_yaml_str(raw).unwrap();
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.locale.currency_marker, "IDR");
        assert_eq!(config.locale.thousands_separator, '.');
        assert_eq!(
            config.dataset_path(DatasetKind::Projects),
            PathBuf::from("/srv/sheets/registry.csv")
        );
        assert_eq!(
            config.dataset_path(DatasetKind::Employees),
            PathBuf::from("/srv/sheets/Employees.csv")
        );
    }

    #[test]
    fn invalid_delimiter_is_rejected() {
        assert!(Config::from_yaml_str("source:\n  delimiter: ab\n").is_err());
        assert!(Config::from_yaml_str("source:\n  encoding: klingon\n").is_err());
    }
}
