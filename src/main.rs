use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use solverbench::config::{BenchConfig, Overrides};
use solverbench::toolchain::ProcessToolchain;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "solverbench",
    about = "Benchmark constraint solvers against a directory of model files",
    version,
    long_about = None
)]
struct Cli {
    /// TOML config file (defaults to $SOLVERBENCH_CONFIG, then ./solverbench.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Toolchain program used to list solvers and run models
    #[arg(long, global = true)]
    toolchain: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every model against every solver and save the results
    Run(RunArgs),

    /// Show which solvers a run would use
    ///
    /// A `run.solvers` list in the config file still takes precedence over detection.
    Solvers {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// List the model files a run would benchmark
    Models {
        /// Directory containing model files [default: benchmarks/CP]
        #[arg(long)]
        models_dir: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Directory containing model files [default: benchmarks/CP]
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Solvers to test [default: auto-detect]
    #[arg(long, num_args = 1..)]
    solvers: Option<Vec<String>>,

    /// Timeout in seconds per solver run [default: 300]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Output directory for results [default: results]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Force emoji status icons
    #[arg(long, conflicts_with = "no_emoji")]
    emoji: bool,

    /// Disable emoji status icons (plain [OK]/[FAIL] tags)
    #[arg(long)]
    no_emoji: bool,
}

impl RunArgs {
    fn overrides(self, toolchain: Option<String>) -> Overrides {
        let emoji = match (self.emoji, self.no_emoji) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            toolchain,
            models_dir: self.models_dir,
            output_dir: self.output_dir,
            timeout_secs: self.timeout,
            solvers: self.solvers,
            emoji,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config =
        BenchConfig::load_or_default(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run(args) => {
            config.apply(args.overrides(cli.toolchain));
            config.validate()?;
            let toolchain = ProcessToolchain::new(config.toolchain.program.clone());

            tracing::info!(
                models_dir = %config.run.models_dir.display(),
                output_dir = %config.run.output_dir.display(),
                timeout_secs = config.run.timeout_secs,
                "Running solver benchmark"
            );
            if solverbench::run_benchmark(&config, &toolchain).await?.is_none() {
                tracing::info!("nothing to benchmark");
            }
        }
        Commands::Solvers { json } => {
            config.apply(Overrides {
                toolchain: cli.toolchain,
                ..Default::default()
            });
            let toolchain = ProcessToolchain::new(config.toolchain.program.clone());
            let found = solverbench::discovery::resolve_solvers(
                config.run.solvers.as_deref(),
                &toolchain,
                &config.discovery,
            )
            .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                for solver in found {
                    println!("{}", solver);
                }
            }
        }
        Commands::Models { models_dir, json } => {
            config.apply(Overrides {
                models_dir,
                ..Default::default()
            });
            let root = &config.run.models_dir;
            let files =
                solverbench::discovery::find_model_files(root, &config.discovery.model_extension);

            if json {
                let listed: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if files.is_empty() {
                println!("No .{} files found.", config.discovery.model_extension);
            } else {
                for file in &files {
                    println!(
                        "{:<30} {}",
                        solverbench::discovery::model_display_name(root, file),
                        solverbench::discovery::relative_display(root, file)
                    );
                }
            }
        }
    }

    Ok(())
}
