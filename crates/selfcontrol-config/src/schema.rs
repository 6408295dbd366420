//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Daemon and shared file settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Selectable session durations. Empty means use the built-in presets.
    #[serde(default)]
    pub durations: Vec<RawDuration>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Name-resolution override file (default: /etc/hosts)
    pub hosts_path: Option<PathBuf>,

    /// Persisted state record
    pub state_path: Option<PathBuf>,

    /// Expiry check period
    pub poll_interval_seconds: Option<u64>,

    /// How the two actors coordinate access to the shared files
    pub coordination: Option<RawCoordination>,

    /// Lock acquisition attempts before giving up (locked mode only)
    pub lock_retry_attempts: Option<u32>,

    /// Delay between lock attempts in milliseconds (locked mode only)
    pub lock_retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawCoordination {
    Simple,
    Locked,
}

/// Raw preset duration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawDuration {
    pub label: String,
    pub seconds: u64,
}
