//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use chunkweave_core::{
    CompletionCallback, HeuristicSummarizer, shard_documents,
};
use chunkweave_shared::{
    AppConfig, CompletionReport, config_file_path, init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Chunkweave — rewrite markdown into retrieval-ready chunks.
#[derive(Parser)]
#[command(
    name = "chunkweave",
    version,
    about = "Rewrite markdown documents in place into context-enriched chunks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Shard one or more markdown files in place.
    Shard {
        /// Markdown files to rewrite.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum documents processed concurrently (defaults to config).
        #[arg(short, long)]
        workers: Option<usize>,

        /// Skip label generation and context propagation.
        #[arg(long)]
        no_labels: bool,

        /// Config file to use instead of ~/.chunkweave/chunkweave.toml.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit one JSON completion report per document on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "chunkweave=info",
        1 => "chunkweave=debug",
        _ => "chunkweave=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Shard {
            files,
            workers,
            no_labels,
            config,
            json,
        } => shard(files, workers, no_labels, config, json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => {
                let path = init_config()?;
                println!("Wrote default config to {}", path.display());
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config()?;
                println!("# {}", config_file_path()?.display());
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Shard command
// ---------------------------------------------------------------------------

/// Progress + JSON reporting hooked into the engine's completion callback.
struct ShardProgress {
    bar: ProgressBar,
    json: bool,
}

impl CompletionCallback for ShardProgress {
    fn completed(&self, report: &CompletionReport) {
        if self.json {
            match serde_json::to_string(report) {
                Ok(line) => self.bar.println(line),
                Err(e) => self.bar.println(format!("report serialization failed: {e}")),
            }
        }
        let status = if report.succeeded { "ok" } else { "FAILED" };
        self.bar
            .set_message(format!("{status} {}", report.file_path.display()));
        self.bar.inc(1);
    }
}

async fn shard(
    files: Vec<PathBuf>,
    workers: Option<usize>,
    no_labels: bool,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let app_config: AppConfig = match config {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };

    let mut chunk_config = app_config.chunking.clone();
    if no_labels {
        chunk_config.enable_tag_reasoning = false;
    }
    let worker_count = workers.unwrap_or(app_config.runtime.worker_count);

    info!(
        documents = files.len(),
        worker_count,
        labels = chunk_config.enable_tag_reasoning,
        "starting shard run"
    );

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let callback: Arc<dyn CompletionCallback> = Arc::new(ShardProgress {
        bar: bar.clone(),
        json,
    });

    let results = shard_documents(
        files,
        chunk_config,
        Arc::new(HeuristicSummarizer::default()),
        Some(callback),
        worker_count,
    )
    .await;

    bar.finish_and_clear();

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(outcome) => println!(
                "{}: {} boundaries, {} labeled blocks in {} ms",
                path.display(),
                outcome.boundary_count,
                outcome.labeled_blocks,
                outcome.elapsed.as_millis()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", path.display());
            }
        }
    }

    if failed > 0 {
        return Err(eyre!("{failed} of {} documents failed", results.len()));
    }
    Ok(())
}
