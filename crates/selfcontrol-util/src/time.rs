//! Time utilities for selfcontrol
//!
//! Sessions are bounded by wall-clock time so that both actors, which may
//! be separate processes started at different moments, agree on expiry by
//! looking only at the persisted record.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `SELFCONTROL_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "SELFCONTROL_MOCK_TIME";

/// Offset between mock time and real time, fixed at first use so that
/// mock time advances naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.signed_duration_since(Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    // Round to the nearest second for display
    let total_secs = (d.as_millis() + 500) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Parse a duration such as `45s`, `5m`, `1h30m`, `1h 30m`, `2min 30s`
/// or a bare number of seconds. Returns `None` for empty, zero, or
/// malformed input.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let duration = match input.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(input).ok()?,
    };

    (!duration.is_zero()).then_some(duration)
}

/// A selectable blocking duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDuration {
    pub label: String,
    pub duration: Duration,
}

impl PresetDuration {
    pub fn new(label: impl Into<String>, duration: Duration) -> Self {
        Self {
            label: label.into(),
            duration,
        }
    }
}

/// Built-in durations offered when the config does not define its own
pub fn default_presets() -> Vec<PresetDuration> {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;

    [
        ("30 seconds", 30),
        ("5 minutes", 5 * MINUTE),
        ("15 minutes", 15 * MINUTE),
        ("1 hour", HOUR),
        ("4 hours", 4 * HOUR),
        ("6 hours", 6 * HOUR),
        ("8 hours", 8 * HOUR),
    ]
    .into_iter()
    .map(|(label, secs)| PresetDuration::new(label, Duration::from_secs(secs)))
    .collect()
}
