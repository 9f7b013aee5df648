//! Taskgate CLI
//!
//! The `taskgate` command runs task specs through the decision
//! pipeline.
//!
//! ## Commands
//!
//! - `run`: full run, persists artifacts and prints the response
//! - `preflight`: normalize and price a task without executing it
//! - `validate`: check a document against one of the schemas

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use taskgate_core::{
    provider_from_env, FsArtifactStore, MemoryArtifactStore, Pipeline, PipelineConfig,
    RunResponse, SchemaKind, StubTransport, SyntheticProvider,
};

#[derive(Parser)]
#[command(name = "taskgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cost-bounded, capability-scoped task pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Pipeline configuration file (TOML)
    #[arg(long, global = true, env = "TASKGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory for run artifacts
    #[arg(long, global = true, default_value = "artifacts")]
    artifacts_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task end to end and print the response
    Run {
        /// Path to the task spec (JSON)
        #[arg(short, long)]
        task: PathBuf,
    },

    /// Normalize and price a task without executing it
    Preflight {
        /// Path to the task spec (JSON)
        #[arg(short, long)]
        task: PathBuf,
    },

    /// Validate a document against a schema
    Validate {
        /// Schema kind: task_spec, preflight_report, bot_package or audit_report
        #[arg(short, long)]
        kind: SchemaKind,

        /// Path to the document (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    taskgate_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run { task } => {
            let config = load_config(cli.config.as_deref())?;
            let store = FsArtifactStore::new(&cli.artifacts_dir).with_context(|| {
                format!("Failed to open artifact store at {:?}", cli.artifacts_dir)
            })?;
            let provider = provider_from_env(&config.completion);
            let pipeline = Pipeline::new(
                config,
                Arc::from(provider),
                Arc::new(StubTransport::default()),
                Arc::new(store),
            );
            let response = cmd_run(&pipeline, &task).await?;
            if response.http_status() != 200 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Preflight { task } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_preflight(config, &task)
        }
        Commands::Validate { kind, file } => cmd_validate(kind, &file),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    PipelineConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {:?}", p),
        None => "Failed to load configuration".to_string(),
    })
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("{:?} is not valid JSON", path))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run a task and print the HTTP-shaped response.
async fn cmd_run(pipeline: &Pipeline, task: &Path) -> Result<RunResponse> {
    let payload = read_json_file(task)?;
    let response = pipeline.run(&payload).await;
    info!(
        run_id = %response.run_id(),
        http_status = response.http_status(),
        "run complete"
    );
    print_json(&serde_json::json!({
        "http_status": response.http_status(),
        "body": response,
    }))?;
    Ok(response)
}

/// Normalize and price a task; nothing is executed or persisted.
fn cmd_preflight(config: PipelineConfig, task: &Path) -> Result<()> {
    let payload = read_json_file(task)?;
    let provider = SyntheticProvider::new().with_limits(config.completion);
    let pipeline = Pipeline::new(
        config,
        Arc::new(provider),
        Arc::new(StubTransport::default()),
        Arc::new(MemoryArtifactStore::new()),
    );
    let outcome = pipeline
        .preflight(&payload)
        .context("Preflight failed")?;
    print_json(&outcome)
}

fn cmd_validate(kind: SchemaKind, file: &Path) -> Result<()> {
    let payload = read_json_file(file)?;
    let document = taskgate_core::validate(kind, &payload)
        .with_context(|| format!("{:?} is not a valid {}", file, kind))?;
    print_json(&document)?;
    eprintln!("valid {}", kind);
    Ok(())
}
