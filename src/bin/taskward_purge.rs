//! Scheduled hard purge of long-tombstoned tasks and users.
//!
//! Usage:
//!
//! ```text
//! taskward-purge --config taskward.toml [--cutoff-days 30] [--batch-limit 200]
//! ```
//!
//! The database URL comes from the config file or `TASKWARD_DATABASE_URL`.
//! Logs go to stderr; set `RUST_LOG` to adjust verbosity.

use clap::Parser;
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use taskward::config::{ConfigError, EngineConfig};
use taskward::persistence::StoreError;
use taskward::persistence::adapters::postgres::PostgresStore;
use taskward::task::services::{RetentionService, TaskServiceError};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DATABASE_URL_ENV: &str = "TASKWARD_DATABASE_URL";

/// Purge tombstoned records older than the retention cutoff.
#[derive(Debug, Parser)]
#[command(name = "taskward-purge", about = "Purge long-tombstoned tasks and users")]
struct Cli {
    /// Path to the engine TOML configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the retention cutoff in days.
    #[arg(long)]
    cutoff_days: Option<u32>,
    /// Override the per-transaction batch limit.
    #[arg(long)]
    batch_limit: Option<usize>,
}

#[derive(Debug, Error)]
enum PurgeCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no database URL: set database.url or {DATABASE_URL_ENV}")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Purge(#[from] TaskServiceError),
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run(&Cli::parse()).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "purge failed");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), PurgeCommandError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taskward=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = cli
        .config
        .as_deref()
        .map_or_else(|| Ok(EngineConfig::default()), EngineConfig::load)?;
    let cutoff_days = cli.cutoff_days.unwrap_or(config.retention.cutoff_days);
    let batch_limit = cli.batch_limit.unwrap_or(config.retention.batch_limit);
    let database_url = config
        .database
        .url
        .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
        .ok_or(PurgeCommandError::MissingDatabaseUrl)?;

    let store = PostgresStore::connect(&database_url, config.database.max_connections)?;
    let service = RetentionService::new(Arc::new(store), Arc::new(DefaultClock));
    info!(cutoff_days, batch_limit, "starting purge");
    let report = service.purge(cutoff_days, batch_limit).await?;
    info!(
        tasks = report.tasks,
        users = report.users,
        batches = report.batches,
        "purge complete"
    );
    Ok(())
}
