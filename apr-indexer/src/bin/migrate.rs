//! Schema migration tool: `apr-migrate [up|down|reset]`

use anyhow::{Context, Result};
use apr_indexer::database::{revert_all, revert_last, run_migrations, PostgresStore};
use apr_indexer::{init_logging, AppConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use tracing::{info, warn};

const USAGE: &str = "Invalid argument. Use 'up', 'down', or 'reset'.";

#[derive(Parser)]
#[command(name = "apr-migrate")]
#[command(about = "Apply or revert the APR indexer database schema")]
struct Cli {
    /// up (default), down or reset
    action: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    Reset,
}

impl Action {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.unwrap_or("up") {
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "reset" => Some(Action::Reset),
            _ => None,
        }
    }
}

/// Outcome of reading the command line
#[derive(Debug)]
enum Invocation {
    Run { action: Action, config: String },
    /// `--help` and similar; clap prints and exits 0
    Info(clap::Error),
    Invalid,
}

fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Invocation::Info(e)
        }
        Err(_) => return Invocation::Invalid,
    };
    match Action::parse(cli.action.as_deref()) {
        Some(action) => Invocation::Run {
            action,
            config: cli.config,
        },
        None => Invocation::Invalid,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (action, config_path) = match parse_args(std::env::args_os()) {
        Invocation::Run { action, config } => (action, config),
        Invocation::Info(e) => e.exit(),
        Invocation::Invalid => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    init_logging(&config)?;

    let store = PostgresStore::connect(config.database.connect_options()?, 1)
        .await
        .context("Failed to connect to database")?;

    match action {
        Action::Up => {
            run_migrations(&store.pool).await?;
            info!("Migrations applied successfully");
        }
        Action::Down => match revert_last(&store.pool).await? {
            Some(version) => info!(version, "Reverted last migration"),
            None => info!("No migrations to revert"),
        },
        Action::Reset => {
            if let Err(e) = revert_all(&store.pool).await {
                warn!(error = %e, "Failed to revert migrations, continuing with apply");
            }
            run_migrations(&store.pool).await?;
            info!("Database reset successfully");
        }
    }

    Ok(())
}
