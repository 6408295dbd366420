//! Default paths for selfcontrol components
//!
//! Provides centralized path defaults that all crates can use:
//! - State record: `$XDG_CONFIG_HOME/selfcontrol-tui/state.json` or `~/.config/selfcontrol-tui/state.json`
//! - Config file: same directory, `config.toml`
//! - Hosts file: `/etc/hosts`
//!
//! These are computed once by the binaries and threaded into the store and
//! hosts engine as plain values.

use std::path::PathBuf;

/// Environment variable for overriding the state directory
pub const SELFCONTROL_STATE_DIR_ENV: &str = "SELFCONTROL_STATE_DIR";

/// Environment variable for overriding the config file path
pub const SELFCONTROL_CONFIG_ENV: &str = "SELFCONTROL_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "selfcontrol-tui";

/// State record filename within the state directory
const STATE_FILENAME: &str = "state.json";

/// Config filename within the state directory
const CONFIG_FILENAME: &str = "config.toml";

/// The system name-resolution override file
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Get the default state directory.
///
/// Order of precedence:
/// 1. `$SELFCONTROL_STATE_DIR` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/selfcontrol-tui` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/selfcontrol-tui` (fallback)
pub fn default_state_dir() -> PathBuf {
    if let Ok(path) = std::env::var(SELFCONTROL_STATE_DIR_ENV) {
        return PathBuf::from(path);
    }

    state_dir_without_env()
}

/// Get the state directory without checking SELFCONTROL_STATE_DIR.
/// Used for default values in configs where the env var is checked separately.
pub fn state_dir_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR)
}

/// Get the default state record path
pub fn default_state_path() -> PathBuf {
    default_state_dir().join(STATE_FILENAME)
}

/// Get the default config file path.
///
/// `$SELFCONTROL_CONFIG` wins over the state directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(SELFCONTROL_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    default_state_dir().join(CONFIG_FILENAME)
}

/// Get the default hosts file path
pub fn default_hosts_path() -> PathBuf {
    PathBuf::from(DEFAULT_HOSTS_PATH)
}
