use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cron_exporter::config::{parse_users, Config};
use cron_exporter::error::ExporterErrorTrait;
use cron_exporter::metrics;
use cron_exporter::server::ExporterServer;

#[derive(Parser)]
#[command(
    name = "cron-exporter",
    version,
    about = "Prometheus exporter reporting the last-run status of per-user cron jobs",
    long_about = None
)]
struct Cli {
    /// Address on which to expose metrics and web interface
    #[arg(long = "telemetry.address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "telemetry.endpoint")]
    metrics_path: Option<String>,

    /// Comma-separated list of users whose crontabs are scanned
    #[arg(long = "cron.users")]
    users: Option<String>,

    /// Log file cron writes execution records to
    #[arg(long = "syslog.file")]
    syslog_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long)]
    log_format: Option<String>,
}

impl Cli {
    /// Defaults < file < environment < flags
    fn load_config(&self) -> cron_exporter::error::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env();

        if let Some(v) = &self.listen_address {
            config.server.listen_address = v.clone();
        }
        if let Some(v) = &self.metrics_path {
            config.server.metrics_path = v.clone();
        }
        if let Some(v) = &self.users {
            config.cron.users = parse_users(v);
        }
        if let Some(v) = &self.syslog_file {
            config.cron.syslog_file = v.clone();
        }
        if let Some(v) = &self.log_format {
            config.logging.format = v.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("Invalid configuration")?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    if let Err(e) = run(config).await {
        tracing::error!(
            category = e.category().as_str(),
            recoverable = e.is_recoverable(),
            "Exporter stopped: {}",
            e
        );
        return Err(e.into());
    }

    Ok(())
}

async fn run(config: Config) -> cron_exporter::error::Result<()> {
    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Exporter self-metrics unavailable");
    }

    let server = ExporterServer::new(config)?;
    tracing::info!("{}", server.info().display());

    server.start_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("cron_exporter=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("cron_exporter={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to wait for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
