//! Result records: one per (model, solver) attempt.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome class of a single solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Timeout,
    Error,
    /// Placeholder while an attempt is in flight. Never persisted.
    Unknown,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Timeout => write!(f, "timeout"),
            RunStatus::Error => write!(f, "error"),
            RunStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One row of `detailed_results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub model: String,
    pub model_path: String,
    pub solver: String,
    pub status: RunStatus,
    /// Seconds. `None` only for attempts that never ran to an exit.
    pub time: Option<f64>,
    pub error: Option<String>,
}

impl ResultRecord {
    /// Start a record for an attempt that has not run yet.
    pub fn pending(model: &str, model_path: &Path, solver: &str) -> Self {
        Self {
            model: model.to_string(),
            model_path: model_path.display().to_string(),
            solver: solver.to_string(),
            status: RunStatus::Unknown,
            time: None,
            error: None,
        }
    }

    pub fn succeeded(mut self, elapsed_secs: f64) -> Self {
        self.status = RunStatus::Success;
        self.time = Some(elapsed_secs);
        self.error = None;
        self
    }

    /// Keeps the measured wall time; the summary still treats it as unsolved.
    pub fn failed(mut self, detail: String, elapsed_secs: f64) -> Self {
        self.status = RunStatus::Failed;
        self.time = Some(elapsed_secs);
        self.error = Some(detail);
        self
    }

    /// The recorded time is the limit itself, not the observed wall time.
    pub fn timed_out(mut self, limit_secs: f64) -> Self {
        self.status = RunStatus::Timeout;
        self.time = Some(limit_secs);
        self.error = None;
        self
    }

    pub fn errored(mut self, detail: String) -> Self {
        self.status = RunStatus::Error;
        self.time = None;
        self.error = Some(detail);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Keep at most `limit` characters of `text`.
///
/// Counts chars rather than bytes so multi-byte stderr never splits a code point.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
