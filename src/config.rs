//! TOML configuration for solverbench.
//!
//! Layered model: compiled-in defaults, then an optional TOML file, then
//! command-line overrides applied by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming a config file to load when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "SOLVERBENCH_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "solverbench.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub toolchain: ToolchainConfig,
    pub discovery: DiscoveryConfig,
    pub run: RunConfig,
}

impl BenchConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded solverbench configuration");
        Ok(config)
    }

    /// Resolve the config file layer.
    ///
    /// 1. `explicit` (from `--config`): any failure is returned.
    /// 2. The path in `SOLVERBENCH_CONFIG`: failures are logged and skipped.
    /// 3. `./solverbench.toml` if it exists: same treatment.
    /// 4. Compiled-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "SOLVERBENCH_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.timeout_secs == 0 {
            return Err(ConfigError::Invalid("run.timeout_secs must be at least 1".into()));
        }
        if self.toolchain.program.trim().is_empty() {
            return Err(ConfigError::Invalid("toolchain.program must not be empty".into()));
        }
        if self.discovery.model_extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.model_extension must not be empty".into(),
            ));
        }
        if self.discovery.fallback_solvers.is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.fallback_solvers must name at least one solver".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the file layer.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(program) = overrides.toolchain {
            self.toolchain.program = program;
        }
        if let Some(dir) = overrides.models_dir {
            self.run.models_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.run.output_dir = dir;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.run.timeout_secs = secs;
        }
        if let Some(solvers) = overrides.solvers {
            if !solvers.is_empty() {
                self.run.solvers = Some(solvers);
            }
        }
        if overrides.emoji.is_some() {
            self.run.emoji = overrides.emoji;
        }
    }
}

/// Values supplied on the command line. `None` leaves the file layer alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub toolchain: Option<String>,
    pub models_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub solvers: Option<Vec<String>>,
    pub emoji: Option<bool>,
}

// ---------------------------------------------------------------------------
// Toolchain
// ---------------------------------------------------------------------------

/// External solver front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Program name or path. Looked up on `PATH` when bare.
    pub program: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "minizinc".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Extension (without the dot) that marks a model file.
    pub model_extension: String,
    /// Case-insensitive substrings a listed solver id must contain to be kept.
    pub allow_list: Vec<String>,
    /// Used when the listing fails or nothing survives the allow-list.
    pub fallback_solvers: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            model_extension: "mzn".to_string(),
            allow_list: ["gecode", "chuffed", "coin-bc", "cp-sat", "cbc"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_solvers: vec!["coin-bc".to_string(), "cp-sat".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub models_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Per-invocation wall-clock limit.
    pub timeout_secs: u64,
    /// Max characters of captured error text kept per record.
    pub error_detail_limit: usize,
    /// Explicit solver list. Skips discovery when set.
    pub solvers: Option<Vec<String>>,
    /// Force icons on or off. Auto-detected when unset.
    pub emoji: Option<bool>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("benchmarks/CP"),
            output_dir: PathBuf::from("results"),
            timeout_secs: 300,
            error_detail_limit: 200,
            solvers: None,
            emoji: None,
        }
    }
}

impl RunConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
