//! Validated settings structures

use crate::schema::{RawConfig, RawCoordination, RawDaemonConfig};
use selfcontrol_util::{
    default_hosts_path, default_presets, default_state_path, CoordinationMode, LockRetry,
    PresetDuration,
};
use std::path::PathBuf;
use std::time::Duration;

/// Default expiry check period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Validated settings ready for use by the daemon and the control surface
#[derive(Debug, Clone)]
pub struct Settings {
    pub daemon: DaemonConfig,

    /// Selectable session durations, in display order
    pub durations: Vec<PresetDuration>,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let durations = if raw.durations.is_empty() {
            default_presets()
        } else {
            raw.durations
                .into_iter()
                .map(|d| PresetDuration::new(d.label, Duration::from_secs(d.seconds)))
                .collect()
        };

        Self {
            daemon: DaemonConfig::from_raw(raw.daemon),
            durations,
        }
    }

    /// Find a preset by its label (exact match)
    pub fn find_duration(&self, label: &str) -> Option<&PresetDuration> {
        self.durations.iter().find(|d| d.label == label)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daemon: DaemonConfig::default(),
            durations: default_presets(),
        }
    }
}

/// Shared file locations and enforcement timing
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub hosts_path: PathBuf,
    pub state_path: PathBuf,
    pub poll_interval: Duration,
    pub coordination: CoordinationMode,
}

impl DaemonConfig {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        let coordination = match raw.coordination {
            Some(RawCoordination::Locked) => {
                let defaults = LockRetry::default();
                CoordinationMode::Locked(LockRetry {
                    attempts: raw.lock_retry_attempts.unwrap_or(defaults.attempts),
                    delay: raw
                        .lock_retry_delay_ms
                        .map(Duration::from_millis)
                        .unwrap_or(defaults.delay),
                })
            }
            Some(RawCoordination::Simple) | None => CoordinationMode::Simple,
        };

        Self {
            hosts_path: raw.hosts_path.unwrap_or_else(default_hosts_path),
            state_path: raw.state_path.unwrap_or_else(default_state_path),
            poll_interval: raw
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            coordination,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_raw(RawDaemonConfig::default())
    }
}
