//! Configuration validation

use crate::schema::{RawConfig, RawCoordination, RawDaemonConfig};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Duration '{label}': {message}")]
    DurationError { label: String, message: String },

    #[error("Duplicate duration label: {0}")]
    DuplicateDurationLabel(String),

    #[error("Path for {field} must be absolute: {path}")]
    RelativePath { field: &'static str, path: String },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_daemon(&config.daemon);

    let mut seen_labels = HashSet::new();
    for duration in &config.durations {
        if duration.label.trim().is_empty() {
            errors.push(ValidationError::DurationError {
                label: duration.label.clone(),
                message: "label cannot be empty".into(),
            });
        } else if !seen_labels.insert(duration.label.as_str()) {
            errors.push(ValidationError::DuplicateDurationLabel(
                duration.label.clone(),
            ));
        }

        if duration.seconds == 0 {
            errors.push(ValidationError::DurationError {
                label: duration.label.clone(),
                message: "seconds must be greater than zero".into(),
            });
        }
    }

    errors
}

fn validate_daemon(daemon: &RawDaemonConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if daemon.poll_interval_seconds == Some(0) {
        errors.push(ValidationError::GlobalError(
            "poll_interval_seconds must be greater than zero".into(),
        ));
    }

    if daemon.lock_retry_attempts == Some(0) {
        errors.push(ValidationError::GlobalError(
            "lock_retry_attempts must be greater than zero".into(),
        ));
    }

    let locked = daemon.coordination == Some(RawCoordination::Locked);
    if !locked && (daemon.lock_retry_attempts.is_some() || daemon.lock_retry_delay_ms.is_some()) {
        tracing::warn!("lock_retry_* settings have no effect unless coordination = \"locked\"");
    }

    for (field, path) in [
        ("hosts_path", &daemon.hosts_path),
        ("state_path", &daemon.state_path),
    ] {
        if let Some(path) = path {
            errors.extend(validate_absolute(field, path));
        }
    }

    errors
}

fn validate_absolute(field: &'static str, path: &Path) -> Option<ValidationError> {
    (!path.is_absolute()).then(|| ValidationError::RelativePath {
        field,
        path: path.display().to_string(),
    })
}
