///! oVirt exporter
///!
///! Serves oVirt engine inventory and statistics as Prometheus metrics

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};

use ovirt_exporter::client::HttpTransport;
use ovirt_exporter::config::ExporterConfig;
use ovirt_exporter::shutdown::ShutdownCoordinator;
use ovirt_exporter::{server, AppState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    generate_config: bool,

    /// Address on which to expose metrics and web interface
    #[arg(long = "web.listen-address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path")]
    metrics_path: Option<String>,

    /// API REST Endpoint
    #[arg(long = "api.url")]
    api_url: Option<String>,

    /// API username
    #[arg(long = "api.username")]
    api_username: Option<String>,

    /// API password
    #[arg(long = "api.password")]
    api_password: Option<String>,

    /// File containing the API password
    #[arg(long = "api.password-file")]
    api_password_file: Option<PathBuf>,

    /// Skip verification of the API certificate
    #[arg(long = "api.insecure-cert", num_args = 0..=1, default_missing_value = "true")]
    insecure_cert: Option<bool>,

    /// Collect snapshot metrics
    #[arg(long = "with-snapshots", num_args = 0..=1, default_missing_value = "true")]
    with_snapshots: Option<bool>,

    /// Collect network metrics
    #[arg(long = "with-network", num_args = 0..=1, default_missing_value = "true")]
    with_network: Option<bool>,

    /// Collect disk metrics
    #[arg(long = "with-disks", num_args = 0..=1, default_missing_value = "true")]
    with_disks: Option<bool>,

    /// Show verbose output (e.g. body of each response received from API)
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Flags given on the command line win over file and environment
    fn apply(&self, config: &mut ExporterConfig) {
        if let Some(address) = &self.listen_address {
            config.server.listen_address = address.clone();
        }
        if let Some(path) = &self.metrics_path {
            config.server.metrics_path = path.clone();
        }
        if let Some(url) = &self.api_url {
            config.api.url = url.clone();
        }
        if let Some(username) = &self.api_username {
            config.api.username = username.clone();
        }
        if let Some(password) = &self.api_password {
            config.api.password = password.clone();
        }
        if let Some(path) = &self.api_password_file {
            config.api.password_file = Some(path.clone());
        }
        if let Some(insecure) = self.insecure_cert {
            config.api.insecure_cert = insecure;
        }
        if let Some(enabled) = self.with_snapshots {
            config.collector.with_snapshots = enabled;
        }
        if let Some(enabled) = self.with_network {
            config.collector.with_network = enabled;
        }
        if let Some(enabled) = self.with_disks {
            config.collector.with_disks = enabled;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", ExporterConfig::generate_sample());
        return Ok(());
    }

    let mut config = ExporterConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.resolve_password()?;
    config.validate()?;

    let _log_guard = config
        .logging
        .clone()
        .with_debug(cli.debug)
        .init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting oVirt exporter (version {})", env!("CARGO_PKG_VERSION"));
    info!("Scraping from {}", config.api.url);

    let listen_addr = config.listen_addr()?;
    let transport = Arc::new(HttpTransport::new(&config.api, cli.debug)?);
    let state = Arc::new(AppState::new(config, transport)?);
    let client = Arc::clone(&state.client);
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    let shutdown = ShutdownCoordinator::new();
    let signals = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals.wait_for_signal().await {
            error!("Failed to install signal handlers: {}", e);
        }
    });

    // In-flight scrapes stop issuing engine requests once shutdown starts.
    let stopping = shutdown.signal();
    tokio::spawn(async move {
        stopping.await;
        client.close();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
