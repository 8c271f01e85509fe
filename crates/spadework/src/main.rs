//! Spadework Script Host
//!
//! Standalone runner: scans the script directory, watches it for changes,
//! and hot-reloads scripts until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use spadework::{Host, HostConfig, NativeRegistry, on_load, on_unload};

/// Spadework Live Script Host
#[derive(Parser, Debug)]
#[command(name = "spadework")]
#[command(about = "Live script host for the game server", long_about = None)]
struct Args {
    /// Path to the script directory
    #[arg(short, long, default_value = "./scripts")]
    scripts: PathBuf,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with the host's native function registry (name -> address)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Exit after the startup scan instead of watching for changes
    #[arg(long)]
    no_watch: bool,

    /// Don't fire the simulated connection sequence on reload
    #[arg(long)]
    no_simulate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spadework=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting spadework v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    config.scripts_dir = args.scripts.clone();
    if args.no_simulate {
        config.simulate_connect = false;
    }

    let host = match &args.registry {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            match on_load(&json, config) {
                Ok(host) => host,
                Err(e) => {
                    error!("failed to bootstrap native registry: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            info!("no native registry given, using built-in loopback natives");
            Host::new(config, Arc::new(NativeRegistry::loopback()))
        }
    };

    host.orchestrator().scan_existing().await;

    if !args.no_watch {
        tokio::select! {
            result = host.run_watch() => {
                if let Err(e) = result {
                    error!("watcher stopped: {}", e);
                }
            }
            _ = shutdown_signal() => {}
        }
    }

    on_unload(&host);
    info!("shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
