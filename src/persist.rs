//! Writing run artifacts: the detailed record list and the pivoted summary.

use crate::record::ResultRecord;
use crate::summary::SummaryTable;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

pub const DETAILED_FILE: &str = "detailed_results.json";
pub const SUMMARY_FILE: &str = "solver_comparison.csv";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode results: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Outcome of writing both artifacts. Each write is attempted independently.
#[derive(Debug)]
pub struct PersistReport {
    pub detailed: Result<PathBuf, PersistError>,
    pub summary: Result<PathBuf, PersistError>,
}

impl PersistReport {
    pub fn all_ok(&self) -> bool {
        self.detailed.is_ok() && self.summary.is_ok()
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    std::fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: PathBuf, contents: &[u8]) -> Result<PathBuf, PersistError> {
    std::fs::write(&path, contents).map_err(|source| PersistError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Every record, in run order, pretty-printed with nulls kept.
pub fn write_detailed(dir: &Path, records: &[ResultRecord]) -> Result<PathBuf, PersistError> {
    ensure_dir(dir)?;
    let json = serde_json::to_string_pretty(records)?;
    write_file(dir.join(DETAILED_FILE), json.as_bytes())
}

pub fn write_summary(dir: &Path, table: &SummaryTable) -> Result<PathBuf, PersistError> {
    ensure_dir(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let csv_err = |source: csv::Error| PersistError::Csv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
    table.write_csv(&mut writer).map_err(csv_err)?;
    Ok(path)
}

/// Write both artifacts. A failure in one never skips the other.
pub fn persist(dir: &Path, records: &[ResultRecord], table: &SummaryTable) -> PersistReport {
    let detailed = write_detailed(dir, records);
    if let Err(e) = &detailed {
        error!(error = %e, "failed to write detailed results");
    }

    let summary = write_summary(dir, table);
    if let Err(e) = &summary {
        error!(error = %e, "failed to write summary table");
    }

    if detailed.is_ok() && summary.is_ok() {
        info!(dir = %dir.display(), records = records.len(), "results saved");
    }

    PersistReport { detailed, summary }
}
