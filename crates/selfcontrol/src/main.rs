//! selfcontrol - Website blocker control surface
//!
//! Edits the block list and starts blocking sessions. Starting a session
//! writes the hosts file, so that command needs root; selfcontrold ends
//! the session when its time is up.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use selfcontrol_config::{load_config_or_default, Settings};
use selfcontrol_core::{Controller, HostsEngine};
use selfcontrol_store::JsonStateStore;
use selfcontrol_util::{default_config_path, is_mock_time_active, SelfControlError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// selfcontrol - Block distracting websites for a while
#[derive(Parser, Debug)]
#[command(name = "selfcontrol")]
#[command(about = "Block distracting websites for a fixed time", long_about = None)]
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
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the block list, numbered
    List,

    /// Add patterns such as `reddit.com` or `*.linkedin.*`
    Add {
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Remove patterns by their number in `list`
    Remove {
        #[arg(required = true, value_parser = clap::value_parser!(u64).range(1..))]
        numbers: Vec<u64>,
    },

    /// Start blocking, e.g. `start 5 minutes` or `start 1h30m`
    Start {
        #[arg(required = true)]
        duration: Vec<String>,
    },

    /// Show the block list and any running session
    Status,

    /// List the preset session durations
    Durations,

    /// Show the hostnames a pattern blocks, without changing anything
    Expand {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
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

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(&args)?;

    // Pure commands need neither the record nor the hosts file
    match &args.command {
        Command::Durations => {
            commands::durations(&settings);
            return Ok(());
        }
        Command::Expand { patterns } => {
            commands::expand(patterns);
            return Ok(());
        }
        _ => {}
    }

    if !nix::unistd::geteuid().is_root() {
        warn!(
            hosts = %settings.daemon.hosts_path.display(),
            "Not running as root; starting a session will fail"
        );
    }

    let store = Arc::new(JsonStateStore::with_coordination(
        &settings.daemon.state_path,
        settings.daemon.coordination,
    ));
    let mut controller = Controller::new(store, HostsEngine::new(&settings.daemon.hosts_path));

    let now = selfcontrol_util::now();
    if is_mock_time_active() {
        warn!(%now, "Mock time is active");
    }
    if let Err(e) = controller.reconcile(now) {
        warn!(error = %e, "Could not end expired session");
    }

    match args.command {
        Command::List => commands::list(&controller, now),
        Command::Add { patterns } => commands::add(&controller, &patterns),
        Command::Remove { numbers } => commands::remove(&controller, &numbers),
        Command::Start { duration } => commands::start(&mut controller, &settings, &duration, now),
        Command::Status => commands::status(&controller, now),
        Command::Durations | Command::Expand { .. } => Ok(()),
    }
}
