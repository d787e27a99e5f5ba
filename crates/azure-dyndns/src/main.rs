//! Command-line entry point for **azure-dyndns**
//!
//! * Parses the record coordinates and credential flags (or `--config`)
//! * Sets up tracing with a compact formatter
//! * Runs one upsert, or the service loop when `--service` is given
//!
//! This is the only place the process may exit: every component below
//! returns a `Result` and the error is decided here.

use anyhow::Result;
use azure_dyndns_core::{
    Config, cfg::DEFAULT_INTERVAL_SECS, ip::HttpIpResolver, service::run_service,
    update::RecordUpdater,
};
use azure_dyndns_provider::AzureDnsProvider;
use clap::Parser;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// CLI options; a config file, when given, replaces all other flags.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// ID of the subscription where the Azure DNS zone is located
    #[arg(long)]
    subscription_id: Option<String>,

    /// Name of the resource group where the Azure DNS zone is located
    #[arg(long)]
    resource_group: Option<String>,

    /// Name of the Azure DNS zone
    #[arg(long)]
    zone: Option<String>,

    /// Name of the DNS record to update
    #[arg(long)]
    record: Option<String>,

    /// Client ID of the service principal used to login (or set AZURE_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,

    /// Client secret used to authenticate (or set AZURE_CLIENT_SECRET)
    #[arg(long)]
    client_secret: Option<String>,

    /// Azure tenant where the Azure DNS zone is located (or set AZURE_TENANT_ID)
    #[arg(long)]
    tenant: Option<String>,

    /// Path to a JSON configuration file to use instead of the flags
    #[arg(long, env = "AZURE_DYNDNS_CONFIG")]
    config: Option<String>,

    /// Keep running and update the record every --interval seconds
    #[arg(long)]
    service: bool,

    /// Seconds between updates in service mode
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        if let Some(path) = &self.config {
            return Ok(Config::from_file(path)?);
        }
        Ok(Config {
            subscription_id: self.subscription_id.unwrap_or_default(),
            resource_group: self.resource_group.unwrap_or_default(),
            zone_name: self.zone.unwrap_or_default(),
            record_name: self.record.unwrap_or_default(),
            client_id: self.client_id.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            tenant_id: self.tenant.unwrap_or_default(),
            as_service: self.service,
            interval: Duration::from_secs(self.interval),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().compact())
        .init();

    let config = cli.into_config()?;
    config.validate()?;

    let provider = AzureDnsProvider::new(&config)?;
    let updater = RecordUpdater::new(Arc::new(HttpIpResolver::default()), Arc::new(provider));

    if config.as_service {
        info!(
            "service mode: updating {}.{} every {:?}",
            config.record_name, config.zone_name, config.interval
        );
        run_service(&updater, config.interval, shutdown_signal()?).await?;
    } else {
        let result = updater.apply().await?;
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

/// Handlers are registered eagerly so registration failures surface at
/// startup; the returned future resolves once, on the first stop signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received interrupt"),
            Err(e) => {
                tracing::error!("interrupt handler failed: {e}");
                std::future::pending::<()>().await;
            }
        }
    })
}
