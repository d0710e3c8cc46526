//! solverbench -- benchmark constraint solvers against a directory of model files.
//!
//! The crate discovers model files and solver backends, runs every
//! (model, solver) pair through an external toolchain under a timeout, and
//! writes a detailed record list plus a pivoted timing table.

pub mod classify;
pub mod config;
pub mod discovery;
pub mod display;
pub mod persist;
pub mod record;
pub mod runner;
pub mod summary;
pub mod toolchain;

use anyhow::Result;
use config::BenchConfig;
use display::{detect_emoji_support, EnvSnapshot};
use runner::{Benchmark, RunOutcome, RunSettings};
use toolchain::Toolchain;

/// Explicit setting wins; otherwise sniff the terminal.
pub fn resolve_emoji(explicit: Option<bool>) -> bool {
    explicit.unwrap_or_else(|| detect_emoji_support(&EnvSnapshot::capture()))
}

/// Resolve solvers and icons from `config`, then run the full sweep.
///
/// `Ok(None)` means there were no model files and nothing was written.
pub async fn run_benchmark(
    config: &BenchConfig,
    toolchain: &dyn Toolchain,
) -> Result<Option<RunOutcome>> {
    config.validate()?;

    let solvers = discovery::resolve_solvers(
        config.run.solvers.as_deref(),
        toolchain,
        &config.discovery,
    )
    .await;
    let emoji = resolve_emoji(config.run.emoji);

    tracing::info!(
        toolchain = toolchain.name(),
        solvers = ?solvers,
        emoji,
        "benchmark configured"
    );

    let settings = RunSettings::from_config(config, solvers, emoji);
    Ok(Benchmark::new(toolchain, settings).run().await)
}
