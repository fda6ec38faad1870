//! Roadpulse - telemetry replay and real-time distribution
//!
//! # Usage
//!
//! ```bash
//! # Run the ingestion server (HTTP API + channel listener)
//! roadpulse serve --config configs/config.toml
//!
//! # Replay recorded feeds to a running server
//! roadpulse publish --config configs/config.toml
//! roadpulse publish --count 20 --log-level debug
//! ```

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roadpulse_config::{Config, LogFormat, LogOutput};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Roadpulse - telemetry replay and real-time distribution
#[derive(Parser, Debug)]
#[command(name = "roadpulse")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the ingestion server
    Serve(cmd::serve::ServeArgs),

    /// Replay recorded feeds to a server
    Publish(cmd::publish::PublishArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(cli.config.as_deref())?;

    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format, config.log.output)?;

    match cli.command {
        Command::Serve(args) => cmd::serve::run(args, config).await,
        Command::Publish(args) => cmd::publish::run(args, config).await,
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat, output: LogOutput) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match (format, output) {
        (LogFormat::Console, LogOutput::Stdout) => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        (LogFormat::Console, LogOutput::Stderr) => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        (LogFormat::Json, LogOutput::Stdout) => registry.with(fmt::layer().json()).init(),
        (LogFormat::Json, LogOutput::Stderr) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cli_flag_wins() {
        let config = Config::from_str("[log]\nlevel = \"warn\"").unwrap();
        assert_eq!(resolve_log_level(Some("trace"), &config), "trace");
    }

    #[test]
    fn test_config_level_used_without_flag() {
        let config = Config::from_str("[log]\nlevel = \"warn\"").unwrap();
        assert_eq!(resolve_log_level(None, &config), "warn");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(resolve_log_level(None, &Config::default()), "info");
    }

    #[test]
    fn test_parse_publish_count() {
        let cli = Cli::try_parse_from(["roadpulse", "publish", "--count", "3", "-l", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Publish(args) => assert_eq!(args.count, Some(3)),
            Command::Serve(_) => panic!("expected publish"),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["roadpulse", "serve", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
