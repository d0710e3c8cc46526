//! The benchmark sweep: every model against every solver, one at a time.

use crate::classify::classify;
use crate::config::BenchConfig;
use crate::discovery::{find_model_files, model_display_name, relative_display};
use crate::display::{Marker, Markers};
use crate::persist::{persist, PersistReport};
use crate::record::{truncate_chars, ResultRecord, RunStatus};
use crate::summary::SummaryTable;
use crate::toolchain::Toolchain;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Characters of an invocation error echoed on the progress line.
const PROGRESS_ERROR_CHARS: usize = 50;

/// Everything a sweep needs once solvers and icons have been decided.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model_extension: String,
    pub timeout: Duration,
    pub error_detail_limit: usize,
    pub solvers: Vec<String>,
    pub emoji: bool,
}

impl RunSettings {
    pub fn from_config(config: &BenchConfig, solvers: Vec<String>, emoji: bool) -> Self {
        Self {
            models_dir: config.run.models_dir.clone(),
            output_dir: config.run.output_dir.clone(),
            model_extension: config.discovery.model_extension.clone(),
            timeout: config.run.timeout(),
            error_detail_limit: config.run.error_detail_limit,
            solvers,
            emoji,
        }
    }
}

/// What a completed sweep produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<ResultRecord>,
    pub table: SummaryTable,
    pub persisted: PersistReport,
}

pub struct Benchmark<'a> {
    toolchain: &'a dyn Toolchain,
    settings: RunSettings,
    markers: Markers,
}

impl<'a> Benchmark<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, settings: RunSettings) -> Self {
        let markers = Markers::new(settings.emoji);
        Self {
            toolchain,
            settings,
            markers,
        }
    }

    /// Discover models, run the sweep, save artifacts and print the summary.
    ///
    /// Returns `None` when there was nothing to run; no files are written then.
    pub async fn run(&self) -> Option<RunOutcome> {
        self.print_banner();

        if !self.settings.models_dir.is_dir() {
            println!(
                "{} Models directory not found: {}",
                self.markers.get(Marker::Error),
                self.settings.models_dir.display()
            );
        }
        let models = find_model_files(&self.settings.models_dir, &self.settings.model_extension);
        if models.is_empty() {
            println!(
                "{} No .{} files found!",
                self.markers.get(Marker::Error),
                self.settings.model_extension
            );
            info!(dir = %self.settings.models_dir.display(), "no model files, nothing to run");
            return None;
        }

        println!("Found {} model files:", models.len());
        for model in &models {
            println!("  - {}", relative_display(&self.settings.models_dir, model));
        }
        println!();

        info!(
            models = models.len(),
            solvers = self.settings.solvers.len(),
            timeout_secs = self.settings.timeout.as_secs_f64(),
            "starting benchmark sweep"
        );

        let records = self.sweep(&models).await;
        let table = SummaryTable::from_records(&self.settings.solvers, &records);
        let persisted = persist(&self.settings.output_dir, &records, &table);
        self.print_saved(&persisted);
        self.print_summary(&table);

        info!(records = records.len(), "benchmark sweep finished");
        Some(RunOutcome {
            records,
            table,
            persisted,
        })
    }

    /// Run every (model, solver) pair in order. One bad pair never stops the rest.
    pub async fn sweep(&self, models: &[PathBuf]) -> Vec<ResultRecord> {
        let mut records = Vec::with_capacity(models.len() * self.settings.solvers.len());

        for model in models {
            let name = model_display_name(&self.settings.models_dir, model);
            println!(
                "{} Testing {} ({}):",
                self.markers.get(Marker::Testing),
                name,
                relative_display(&self.settings.models_dir, model)
            );

            for solver in &self.settings.solvers {
                records.push(self.run_pair(&name, model, solver).await);
            }
            println!();
        }

        records
    }

    /// One attempt, classified and echoed as a progress line.
    pub async fn run_pair(&self, name: &str, model: &Path, solver: &str) -> ResultRecord {
        print!("  Testing {}... ", solver);
        let _ = std::io::stdout().flush();

        let pending = ResultRecord::pending(name, model, solver);
        let invocation = self
            .toolchain
            .solve(model, solver, self.settings.timeout)
            .await;
        let record = classify(
            pending,
            invocation,
            self.settings.timeout,
            self.settings.error_detail_limit,
        );

        println!("{}", self.progress_line(&record));
        debug!(
            model = name,
            solver,
            status = %record.status,
            elapsed = ?record.time,
            "pair finished"
        );
        record
    }

    fn progress_line(&self, record: &ResultRecord) -> String {
        match record.status {
            RunStatus::Success => format!(
                "{} {:.2}s",
                self.markers.get(Marker::Success),
                record.time.unwrap_or_default()
            ),
            RunStatus::Failed => format!("{} Failed", self.markers.get(Marker::Failed)),
            RunStatus::Timeout => format!(
                "{} Timeout ({}s)",
                self.markers.get(Marker::Timeout),
                self.settings.timeout.as_secs_f64()
            ),
            RunStatus::Error | RunStatus::Unknown => format!(
                "{} Error: {}...",
                self.markers.get(Marker::Error),
                truncate_chars(record.error.as_deref().unwrap_or(""), PROGRESS_ERROR_CHARS)
            ),
        }
    }

    fn print_banner(&self) {
        println!("{} Solver Performance Comparison", self.toolchain.name());
        println!("{}", "=".repeat(50));
        println!("Models directory: {}", self.settings.models_dir.display());
        println!("Timeout: {}s", self.settings.timeout.as_secs_f64());
        println!("Solvers: {}", self.settings.solvers.join(", "));
        println!("Platform: {}", std::env::consts::OS);
        println!();
    }

    fn print_saved(&self, report: &PersistReport) {
        println!("{} Results saved:", self.markers.get(Marker::Results));
        match &report.detailed {
            Ok(path) => println!("  - Detailed: {}", path.display()),
            Err(e) => println!("  - Detailed: {} {}", self.markers.get(Marker::Error), e),
        }
        match &report.summary {
            Ok(path) => println!("  - Summary: {}", path.display()),
            Err(e) => println!("  - Summary: {} {}", self.markers.get(Marker::Error), e),
        }
    }

    fn print_summary(&self, table: &SummaryTable) {
        if table.is_empty() {
            println!("No results to display.");
            return;
        }

        println!(
            "\n{} Performance Summary (seconds):",
            self.markers.get(Marker::Summary)
        );
        println!("{}", "=".repeat(50));
        print!("{}", table.render());

        println!(
            "\n{} Success Rate by Solver:",
            self.markers.get(Marker::Results)
        );
        println!("{}", "-".repeat(30));
        for rate in table.success_rates() {
            println!("{}", rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::{Invocation, ToolchainError};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers every solve with the next scripted invocation and logs the call.
    struct Scripted {
        answers: Mutex<Vec<Invocation>>,
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl Scripted {
        fn new(mut answers: Vec<Invocation>) -> Self {
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Toolchain for Scripted {
        fn name(&self) -> &str {
            "fakezinc"
        }

        async fn list_solvers(&self) -> Result<String, ToolchainError> {
            Ok(String::new())
        }

        async fn solve(&self, model: &Path, solver: &str, _limit: Duration) -> Invocation {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_path_buf(), solver.to_string()));
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Invocation::Errored("no scripted answer".to_string()))
        }
    }

    fn settings(dir: &TempDir, solvers: &[&str]) -> RunSettings {
        RunSettings {
            models_dir: dir.path().join("models"),
            output_dir: dir.path().join("results"),
            model_extension: "mzn".to_string(),
            timeout: Duration::from_secs(5),
            error_detail_limit: 200,
            solvers: solvers.iter().map(|s| s.to_string()).collect(),
            emoji: false,
        }
    }

    fn ok(secs: f64) -> Invocation {
        Invocation::Exited {
            code: Some(0),
            success: true,
            stdout: "----------\n".to_string(),
            stderr: String::new(),
            elapsed: Duration::from_secs_f64(secs),
        }
    }

    #[tokio::test]
    async fn test_sweep_runs_models_then_solvers_in_order() {
        let dir = TempDir::new().unwrap();
        let tc = Scripted::new(vec![ok(1.0), Invocation::TimedOut, ok(2.0), ok(3.0)]);
        let bench = Benchmark::new(&tc, settings(&dir, &["gecode", "cp-sat"]));

        let models = vec![
            dir.path().join("models/a.mzn"),
            dir.path().join("models/b.mzn"),
        ];
        let records = bench.sweep(&models).await;

        let order: Vec<(String, String)> = records
            .iter()
            .map(|r| (r.model.clone(), r.solver.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), "gecode".to_string()),
                ("a".to_string(), "cp-sat".to_string()),
                ("b".to_string(), "gecode".to_string()),
                ("b".to_string(), "cp-sat".to_string()),
            ]
        );
        assert_eq!(records[1].status, RunStatus::Timeout);
        assert_eq!(records[1].time, Some(5.0));
        assert_eq!(tc.calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_progress_lines_plain() {
        let dir = TempDir::new().unwrap();
        let tc = Scripted::new(Vec::new());
        let bench = Benchmark::new(&tc, settings(&dir, &["gecode"]));
        let base = ResultRecord::pending("q", Path::new("q.mzn"), "gecode");

        assert_eq!(bench.progress_line(&base.clone().succeeded(1.234)), "[OK] 1.23s");
        assert_eq!(bench.progress_line(&base.clone().timed_out(5.0)), "[TIMEOUT] Timeout (5s)");
        assert_eq!(
            bench.progress_line(&base.clone().failed("x".to_string(), 0.2)),
            "[FAIL] Failed"
        );
        assert_eq!(
            bench.progress_line(&base.errored("y".repeat(80))),
            format!("[ERROR] Error: {}...", "y".repeat(50))
        );
    }
}
