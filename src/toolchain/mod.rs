//! The external solver front-end (`minizinc` by default) and how we talk to it.

pub mod process;

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub use process::ProcessToolchain;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not answer within {secs}s")]
    Timeout { program: String, secs: u64 },
}

/// Raw result of one `--solver <id> <model>` invocation, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// The process ran to completion inside the limit.
    Exited {
        code: Option<i32>,
        success: bool,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    },
    /// The limit fired. The child has already been killed and reaped.
    TimedOut,
    /// The process could not be started or waited on.
    Errored(String),
}

/// Anything that can list solvers and run a model through one of them.
#[async_trait::async_trait]
pub trait Toolchain: Send + Sync {
    /// Program name used in banners and logs.
    fn name(&self) -> &str;

    /// Raw stdout of the capability listing (`--solvers`).
    async fn list_solvers(&self) -> Result<String, ToolchainError>;

    /// Run `model` with `solver`, killing the process if it outlives `limit`.
    async fn solve(&self, model: &Path, solver: &str, limit: Duration) -> Invocation;
}
