//! siteprobed — the siteprobe daemon.
//!
//! Single binary that assembles the exporter:
//! - Target store (JSON file)
//! - HTTP prober
//! - Registry + collector (exporter)
//! - REST API + `/metrics`
//!
//! # Usage
//!
//! ```text
//! siteprobed serve --listen 0.0.0.0:8080 --sites-file config/probe/sites.json
//! siteprobed config --config siteprobe.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use siteprobe_core::ExporterConfig;
use siteprobe_health::Prober;
use siteprobe_metrics::Exporter;
use siteprobe_state::JsonFileStore;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,siteprobed=debug,siteprobe=debug";

#[derive(Parser)]
#[command(name = "siteprobed", about = "HTTP latency probe exporter", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the management API and the metrics endpoint.
    Serve {
        #[command(flatten)]
        config: ConfigArgs,

        /// Log output format.
        #[arg(long, value_enum, default_value = "text")]
        log_format: LogFormat,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Configuration sources; flags override the file.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Path to a siteprobe.toml file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on (e.g. 0.0.0.0:8080).
    #[arg(long)]
    listen: Option<String>,

    /// JSON file holding the target list.
    #[arg(long)]
    sites_file: Option<PathBuf>,

    /// Per-probe timeout (e.g. 10s, 500ms).
    #[arg(long)]
    probe_timeout: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, log_format } => {
            init_tracing(log_format);
            let config = resolve_config(&config)?;
            run_server(config).await
        }
        Command::Config { config } => {
            let config = resolve_config(&config)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Merge the optional config file with command-line overrides and validate.
fn resolve_config(args: &ConfigArgs) -> anyhow::Result<ExporterConfig> {
    let mut config = match &args.config {
        Some(path) => ExporterConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ExporterConfig::default(),
    };

    if let Some(listen) = &args.listen {
        config.listen = listen.clone();
    }
    if let Some(sites_file) = &args.sites_file {
        config.sites_file = sites_file.clone();
    }
    if let Some(timeout) = &args.probe_timeout {
        config.probe_timeout = timeout.clone();
    }

    config.listen_addr()?;
    config.probe_timeout()?;
    Ok(config)
}

async fn run_server(config: ExporterConfig) -> anyhow::Result<()> {
    info!("siteprobe exporter starting");

    // ── Initialize subsystems ──────────────────────────────────

    let store = Arc::new(JsonFileStore::new(&config.sites_file));
    let prober = Prober::new(config.probe_timeout()?, &config.user_agent)?;
    info!(timeout = %config.probe_timeout, "prober initialized");

    let exporter = Exporter::open(store, prober).with_context(|| {
        format!("failed to load targets from {}", config.sites_file.display())
    })?;
    info!(
        path = ?config.sites_file,
        targets = exporter.list().await.len(),
        "targets loaded"
    );

    // ── Start API server ───────────────────────────────────────

    let router = siteprobe_api::build_router(Arc::new(exporter));
    let addr = config.listen_addr()?;

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("siteprobe exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
