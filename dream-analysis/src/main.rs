//! dream-analysis command-line entry point
//!
//! Commands:
//! - `analyze`: profile one dream text (from `--text`, `--file` or stdin)
//! - `calendar`: reduce stored analysis records to per-day summaries
//! - `check-artifacts`: validate the model artifact bundles
//!
//! JSON results go to stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dream_analysis::config::{AnalyzerConfig, ConfigOverrides};
use dream_analysis::counsel::counseling_note;
use dream_analysis::scorer::ModelArtifacts;
use dream_analysis::{AnalysisRecord, CalendarAggregator, ModelCache};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", ",
    env!("BUILD_PROFILE"),
    ")"
);

#[derive(Debug, Parser)]
#[command(name = "dream-analysis", version = VERSION, about = "Dream report emotion analysis")]
struct Cli {
    /// TOML config file (default: ~/.config/dreamlens/dream-analysis.toml)
    #[arg(long, global = true, env = "DREAM_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder override
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Model artifacts folder override
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze one dream text and print its profile
    Analyze {
        /// Dream text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the dream text from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Add a reflective counseling note
        #[arg(long)]
        counsel: bool,

        /// Include raw scores and the correction trace
        #[arg(long)]
        explain: bool,
    },

    /// Aggregate analysis records (JSON array) into calendar days
    Calendar {
        /// JSON file of `{date, positive, negative}` records
        #[arg(long)]
        input: PathBuf,

        /// Restrict to one month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },

    /// Load and validate the model artifacts
    CheckArtifacts,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn read_dream_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read dream text from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("Dream text is empty");
    }
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        config_file: cli.config.clone(),
        root_folder: cli.root_folder.clone(),
        artifacts_dir: cli.artifacts.clone(),
    };

    // Config is resolved under a provisional stderr subscriber so its
    // warnings are visible before the configured level is known
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || AnalyzerConfig::resolve(&overrides))
        .context("Failed to load configuration")?;

    init_tracing(&config.log_level)?;
    info!("dream-analysis {} built {}", VERSION, env!("BUILD_TIMESTAMP"));
    info!("Root folder: {}", config.root_folder.display());
    info!("Artifacts: {}", config.artifacts_dir.display());

    match cli.command {
        Command::Analyze {
            text,
            file,
            counsel,
            explain,
        } => {
            let text = read_dream_text(text, file)?;

            let analyzer = ModelCache::global()
                .get_or_load_from(&config.artifacts_dir, config.policy.clone())
                .context("Model artifacts could not be loaded")?;

            let analysis = Arc::clone(&analyzer).run_async(text).await?;

            let mut output = serde_json::to_value(&analysis.profile)?;
            if let Some(object) = output.as_object_mut() {
                if counsel {
                    object.insert(
                        "counseling_note".to_string(),
                        counseling_note(&analysis.corrected).into(),
                    );
                }
                if explain {
                    object.insert(
                        "explain".to_string(),
                        serde_json::json!({
                            "raw": {
                                "valence": analysis.raw.valence,
                                "facets": analysis.raw.facets,
                            },
                            "correction": analysis.corrected.trace,
                        }),
                    );
                }
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Calendar { input, month } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let records: Vec<AnalysisRecord> = serde_json::from_str(&content)
                .with_context(|| format!("Malformed records in {}", input.display()))?;

            let aggregator = CalendarAggregator::new(config.calendar.clone());
            let days = match month {
                Some(month) => aggregator.aggregate_month(&records, &month)?,
                None => aggregator.aggregate(&records),
            };
            info!("Aggregated {} records into {} days", records.len(), days.len());
            println!("{}", serde_json::to_string_pretty(&days)?);
        }

        Command::CheckArtifacts => {
            let artifacts = ModelArtifacts::load(&config.artifacts_dir)
                .context("Model artifacts are not usable")?;
            let summary = artifacts.summary();
            artifacts
                .into_scorer()
                .context("Model artifacts are not usable")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
