use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dopedb_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use dopedb_core::metrics::init_metrics;
use dopedb_core::shutdown::install_signal_handlers;
use dopedb_core::{Config, Database, DbServer, ShutdownCoordinator};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dopedb")]
#[command(author, version, about = "Namespaced key/value store with a whole-store checksum", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the bind address
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "dopedb.toml")]
        path: PathBuf,
    },
    /// Load and validate configuration, then print the effective settings
    CheckConfig,
}

/// File (or defaults), then environment, then command-line flags
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(level) = &args.log_level {
        config.logging.level = level.parse::<LogLevel>()?.to_string();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    if let Some(Command::Serve { bind: Some(addr) }) = &args.command {
        config.server.bind_address = *addr;
    }

    config.validate()?;
    Ok(config)
}

async fn serve(config: Config) -> Result<()> {
    init_metrics();
    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(config.metrics.bind_address)
            .install()
            .context("installing Prometheus exporter")?;
        info!("Prometheus metrics on {}", config.metrics.bind_address);
    }

    let shutdown = Arc::new(ShutdownCoordinator::new(config.server.shutdown_timeout));
    install_signal_handlers(shutdown.clone()).context("installing signal handlers")?;

    let db = Arc::new(Database::with_limits(config.store.clone()));
    DbServer::new(db, &config).run(shutdown).await?;

    info!("dopedb stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    init_logging_with_config(LogConfig::from_config(&config.logging)?)?;

    match args.command {
        None | Some(Command::Serve { .. }) => serve(config).await?,
        Some(Command::InitConfig { path }) => {
            if path.exists() {
                warn!("Overwriting existing configuration at {}", path.display());
            }
            Config::default().save_to_file(&path)?;
            info!("Wrote default configuration to {}", path.display());
        }
        Some(Command::CheckConfig) => {
            info!("Configuration is valid");
            println!("{:#?}", config);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let args = Args::parse_from(["dopedb"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.server.bind_address, Config::default().server.bind_address);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dopedb.toml");
        Config::default().save_to_file(&path).unwrap();

        let args = Args::parse_from([
            "dopedb",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "DEBUG",
            "--json-logs",
            "serve",
            "--bind",
            "127.0.0.1:7070",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:7070".parse().unwrap());
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let args = Args::parse_from(["dopedb", "--log-level", "noisy"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let args = Args::parse_from(["dopedb", "--config", "/nonexistent/dopedb.toml"]);
        assert!(resolve_config(&args).is_err());
    }
}
