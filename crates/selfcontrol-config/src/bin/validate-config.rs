//! Config validation CLI tool
//!
//! Validates a selfcontrol configuration file and reports any errors.

use selfcontrol_config::ConfigError;
use selfcontrol_util::{default_config_path, format_duration, CoordinationMode};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a selfcontrol configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match selfcontrol_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", selfcontrol_config::CURRENT_CONFIG_VERSION);
            println!("  Hosts file:     {}", settings.daemon.hosts_path.display());
            println!("  State record:   {}", settings.daemon.state_path.display());
            println!(
                "  Poll interval:  {}",
                format_duration(settings.daemon.poll_interval)
            );
            match settings.daemon.coordination {
                CoordinationMode::Simple => println!("  Coordination:   simple (no locking)"),
                CoordinationMode::Locked(retry) => println!(
                    "  Coordination:   locked ({} attempts, {}ms apart)",
                    retry.attempts,
                    retry.delay.as_millis()
                ),
            }

            println!();
            println!("Durations:");
            for preset in &settings.durations {
                println!("  - {} ({})", preset.label, format_duration(preset.duration));
            }

            ExitCode::SUCCESS
        }
        Err(ConfigError::ValidationFailed { errors }) => {
            eprintln!("✗ Configuration has {} error(s):", errors.len());
            for error in errors {
                eprintln!("  - {}", error);
            }
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {}", e);
            ExitCode::from(1)
        }
    }
}
