//! selfcontrold - The selfcontrol background service
//!
//! Watches the shared state record and removes the hosts block region once
//! the active session has expired. Must run as root to rewrite the hosts
//! file.

use anyhow::{bail, Context, Result};
use clap::Parser;
use selfcontrol_config::{load_config_or_default, Settings};
use selfcontrol_core::{Enforcer, HostsEngine};
use selfcontrol_store::JsonStateStore;
use selfcontrol_util::{default_config_path, is_mock_time_active, CoordinationMode, SelfControlError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// selfcontrold - Ends website blocking sessions when their time is up
#[derive(Parser, Debug)]
#[command(name = "selfcontrold")]
#[command(about = "Ends website blocking sessions when their time is up", long_about = None)]
struct Args {
    /// Configuration file path (or set SELFCONTROL_CONFIG env var)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Hosts file override
    #[arg(long)]
    hosts_path: Option<PathBuf>,

    /// State record override
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_config_or_default(&args.config)
        .map_err(SelfControlError::from)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(path) = &args.hosts_path {
        settings.daemon.hosts_path = path.clone();
    }
    if let Some(path) = &args.state_path {
        settings.daemon.state_path = path.clone();
    }

    Ok(settings)
}

fn require_root() -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        bail!("selfcontrold must be run as root to modify the hosts file");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = require_root() {
        error!(error = %e, "Refusing to start");
        return Err(e);
    }

    let settings = load_settings(&args)?;
    let daemon = &settings.daemon;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        hosts_path = %daemon.hosts_path.display(),
        state_path = %daemon.state_path.display(),
        locked = matches!(daemon.coordination, CoordinationMode::Locked(_)),
        "selfcontrold starting"
    );

    if is_mock_time_active() {
        warn!(now = %selfcontrol_util::now(), "Mock time active");
    }

    let store = Arc::new(JsonStateStore::with_coordination(
        &daemon.state_path,
        daemon.coordination,
    ));
    let enforcer = Enforcer::new(store, HostsEngine::new(&daemon.hosts_path));

    let mut sigterm = signal(SignalKind::terminate())
        .context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt())
        .context("Failed to create SIGINT handler")?;

    tokio::select! {
        _ = enforcer.run(daemon.poll_interval) => {}
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    // Any active session is left for the next start to enforce
    info!("Shutdown complete");
    Ok(())
}
