//! # bucket-ping
//!
//! ```text
//! bucket-ping --config ping.toml run        # heartbeat until Ctrl+C
//! bucket-ping --config ping.toml discover   # one read round
//! bucket-ping --config ping.toml leave --address <uuid>
//! bucket-ping --config ping.toml purge      # delete every record of the group
//! bucket-ping --print-metrics discover      # Prometheus text after the command
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use bucket_discovery::{DiscoveryBackend, NodeAddress, Responses};
use bucket_telemetry::{gather_text, init_telemetry, TelemetryConfig};
use ping_runtime::{build_registry, local_record, Heartbeat, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(name = "bucket-ping")]
#[command(about = "Group discovery through a shared object store")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the group name
    #[arg(short, long)]
    group: Option<String>,

    /// Override the store backend (s3, file, memory)
    #[arg(short, long)]
    backend: Option<String>,

    /// Print the Prometheus metrics (text format) when the command finishes
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish the local record and refresh the view until interrupted
    Run,
    /// Read the group once and print every record
    Discover {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove one node's record
    Leave {
        /// Address to remove (defaults to node.address from the config)
        #[arg(long)]
        address: Option<String>,
    },
    /// Remove every record of the group
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(group) = args.group {
        config.registry.group = group;
    }
    if let Some(backend) = args.backend {
        config.store.backend = backend;
    }
    config.validate()?;

    let metrics = init_telemetry(&TelemetryConfig::from_env())?;

    let local = local_record(&config)?;
    let registry = build_registry(&config, local.address, metrics).await?;
    let group = config.registry.group.clone();

    info!(
        group = %group,
        backend = %config.store.backend,
        address = %local.address,
        "bucket-ping starting"
    );

    match args.command {
        Command::Run => {
            let heartbeat = Heartbeat::new(
                Arc::new(registry),
                group,
                local,
                config.heartbeat_interval(),
            )
            .remove_on_shutdown(config.heartbeat.remove_on_shutdown);

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle = tokio::spawn(heartbeat.run(shutdown_rx));

            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(true);

            if let Some(view) = handle.await? {
                info!(members = view.size(), coordinator = %view.coordinator, "last view");
            }
        }
        Command::Discover { json } => {
            let mut responses = Responses::new();
            let report = registry
                .read_with_report(None, &group, &mut responses)
                .await;
            if report.is_partial() {
                warn!(skipped = report.skipped_failed, "some records could not be fetched");
            }
            let records = responses.into_records();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}", record);
                }
            }
        }
        Command::Leave { address } => {
            let address = match address {
                Some(raw) => raw.parse::<NodeAddress>()?,
                None => config
                    .node_address()?
                    .context("no --address given and node.address is not configured")?,
            };
            registry.remove(&group, &address).await;
        }
        Command::Purge => {
            registry.remove_all(&group).await;
        }
    }

    if args.print_metrics {
        print!("{}", gather_text()?);
    }

    Ok(())
}
