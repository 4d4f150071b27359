use thiserror::Error;

use crate::store::DatasetKind;

/// A dataset could not be fetched or was structurally unreadable. The store
/// degrades that dataset to an empty table and keeps loading the rest.
#[derive(Debug, Error)]
#[error("{dataset} is unavailable: {reason:#}")]
pub struct SourceError {
    pub dataset: DatasetKind,
    pub reason: anyhow::Error,
}

/// A view needs logical columns the dataset does not provide.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Missing required columns for {view}: {}", .missing.join(", "))]
pub struct SchemaMismatch {
    pub view: &'static str,
    pub missing: Vec<&'static str>,
}

impl SchemaMismatch {
    pub fn new(view: &'static str, missing: Vec<&'static str>) -> Self {
        Self { view, missing }
    }
}
