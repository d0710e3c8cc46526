//! End-to-end runs against shell scripts standing in for the toolchain.
#![cfg(unix)]

use solverbench::config::BenchConfig;
use solverbench::persist::{DETAILED_FILE, SUMMARY_FILE};
use solverbench::record::{ResultRecord, RunStatus};
use solverbench::summary::Timing;
use solverbench::toolchain::ProcessToolchain;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        Self { dir }
    }

    fn models(&self) -> PathBuf {
        self.dir.path().join("models")
    }

    fn results(&self) -> PathBuf {
        self.dir.path().join("results")
    }

    fn add_model(&self, rel: &str) {
        let path = self.models().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "solve satisfy;\n").unwrap();
    }

    /// Executable `/bin/sh` script; `$2` is the solver id, `$3` the model path.
    fn toolchain(&self, body: &str) -> ProcessToolchain {
        let path = self.dir.path().join("fakezinc");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        ProcessToolchain::new(path.display().to_string())
    }

    fn config(&self, solvers: &[&str], timeout_secs: u64) -> BenchConfig {
        let mut cfg = BenchConfig::default();
        cfg.run.models_dir = self.models();
        cfg.run.output_dir = self.results();
        cfg.run.timeout_secs = timeout_secs;
        cfg.run.solvers = Some(solvers.iter().map(|s| s.to_string()).collect());
        cfg.run.emoji = Some(false);
        cfg
    }

    fn saved_records(&self) -> Vec<ResultRecord> {
        let json = std::fs::read_to_string(self.results().join(DETAILED_FILE)).unwrap();
        serde_json::from_str(&json).unwrap()
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_empty_models_dir_writes_nothing() {
    let fx = Fixture::new();
    let tc = fx.toolchain("exit 0");

    let outcome = solverbench::run_benchmark(&fx.config(&["gecode"], 10), &tc)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(count_files(&fx.results()), 0);
}

#[tokio::test]
async fn test_single_success_records_wall_time() {
    let fx = Fixture::new();
    fx.add_model("queens.mzn");
    let tc = fx.toolchain("sleep 2; echo '=========='; exit 0");

    let outcome = solverbench::run_benchmark(&fx.config(&["gecode"], 10), &tc)
        .await
        .unwrap()
        .expect("a model was present");

    assert_eq!(outcome.records.len(), 1);
    let rec = &outcome.records[0];
    assert_eq!(rec.status, RunStatus::Success);
    let t = rec.time.unwrap();
    assert!((1.9..4.0).contains(&t), "unexpected time {t}");

    let cell = outcome.table.cell("queens", "gecode");
    assert_eq!(cell, Timing::Solved(t));
    assert!(outcome.persisted.all_ok());
    assert_eq!(fx.saved_records(), outcome.records);
}

#[tokio::test]
async fn test_timeout_records_limit_and_sentinel() {
    let fx = Fixture::new();
    fx.add_model("golomb.mzn");
    let tc = fx.toolchain("sleep 30; exit 0");

    let start = std::time::Instant::now();
    let outcome = solverbench::run_benchmark(&fx.config(&["gecode"], 2), &tc)
        .await
        .unwrap()
        .unwrap();
    assert!(start.elapsed() < std::time::Duration::from_secs(10));

    let rec = &outcome.records[0];
    assert_eq!(rec.status, RunStatus::Timeout);
    assert_eq!(rec.time, Some(2.0));
    assert_eq!(outcome.table.cell("golomb", "gecode"), Timing::Unsolved);

    let csv = std::fs::read_to_string(fx.results().join(SUMMARY_FILE)).unwrap();
    assert_eq!(csv, ",gecode\ngolomb,inf\n");
}

#[tokio::test]
async fn test_missing_toolchain_is_error_and_sweep_continues() {
    let fx = Fixture::new();
    fx.add_model("a.mzn");
    fx.add_model("b.mzn");
    let tc = ProcessToolchain::new(
        fx.dir.path().join("no-such-minizinc").display().to_string(),
    );

    let outcome = solverbench::run_benchmark(&fx.config(&["gecode", "cp-sat"], 5), &tc)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.records.len(), 4);
    for rec in &outcome.records {
        assert_eq!(rec.status, RunStatus::Error);
        assert!(!rec.error.as_deref().unwrap_or("").is_empty());
        assert!(rec.time.is_none());
    }
    assert!(outcome.table.success_rates().iter().all(|r| r.successes == 0));
}

#[tokio::test]
async fn test_mixed_outcomes_per_solver() {
    let fx = Fixture::new();
    fx.add_model("a.mzn");
    fx.add_model("nested/b.mzn");
    fx.add_model("c.mzn");
    // gecode always works; chuffed fails on b with a long error.
    let tc = fx.toolchain(
        r#"case "$2:$3" in
  chuffed:*b.mzn) printf '%0300d' 0 >&2; exit 1 ;;
  chuffed:*c.mzn) exit 2 ;;
  *) exit 0 ;;
esac"#,
    );

    let outcome = solverbench::run_benchmark(&fx.config(&["gecode", "chuffed"], 10), &tc)
        .await
        .unwrap()
        .unwrap();

    let models: Vec<&str> = outcome.table.rows.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(models, vec!["a", "c", "nested/b"]);

    let failed: Vec<&ResultRecord> = outcome
        .records
        .iter()
        .filter(|r| r.status == RunStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 2);
    for rec in &failed {
        let detail = rec.error.as_deref().unwrap();
        assert!(!detail.is_empty() && detail.chars().count() <= 200);
        // Failed runs keep their wall time but still count as unsolved.
        assert!(rec.time.is_some_and(|t| t >= 0.0));
    }
    let silent = failed.iter().find(|r| r.model == "c").unwrap();
    assert_eq!(silent.error.as_deref(), Some("Unknown error"));
    assert!(matches!(outcome.table.cell("c", "gecode"), Timing::Solved(_)));
    assert_eq!(outcome.table.cell("c", "chuffed"), Timing::Unsolved);

    let rates = outcome.table.success_rates();
    assert_eq!(rates[0].to_string(), "gecode         :  3/3 (100.0%)");
    assert_eq!(rates[1].to_string(), "chuffed        :  1/3 ( 33.3%)");

    assert!(outcome
        .records
        .iter()
        .all(|r| r.status != RunStatus::Unknown));
}
