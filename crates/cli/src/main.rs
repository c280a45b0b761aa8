//! ecom CLI - command-line client for the ecom backend API

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "ecom")]
#[command(about = "Command-line client for the ecom backend API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Data directory for local state (stored login record, logs)
    #[arg(short = 'd', long, global = true, env = "ECOM_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Backend origin; `/api` is appended
    #[arg(short = 'u', long, global = true, env = "ECOM_BACK_END_URL")]
    back_end_url: Option<String>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short = 'c', long, global = true, env = "ECOM_CONFIG")]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref(), cli.back_end_url, cli.data_dir)?;
    logging::init_logging(
        cli.log_level.into(),
        &settings.resolved_state_dir(),
        cli.no_file_log,
    )?;

    info!(
        back_end_url = settings.back_end_url.as_deref().unwrap_or("<unset>"),
        "Starting ecom CLI"
    );

    let outcome = if cli.timeout == 0 {
        cli.command.execute(settings).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(settings)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = outcome {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
