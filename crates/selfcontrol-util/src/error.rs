//! Error types for selfcontrol

use thiserror::Error;

/// Top-level error for control-surface and daemon operations.
///
/// Component crates keep their own error enums (`HostsError`, `StoreError`)
/// and convert into this one at the boundary where both are in play.
#[derive(Debug, Error)]
pub enum SelfControlError {
    /// The hosts file (or state record) could not be written for lack of privilege
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(String),

    /// The persisted state record exists but is malformed
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid pattern: {0:?}")]
    InvalidPattern(String),

    #[error("No patterns to block")]
    NoPatterns,

    #[error("Session already active")]
    SessionAlreadyActive,

    #[error("Timed out waiting for state lock: {0}")]
    LockTimeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SelfControlError {
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether retrying the same write is futile until privileges change
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, SelfControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_detected() {
        assert!(SelfControlError::permission("/etc/hosts").is_permission_denied());
        assert!(!SelfControlError::io("/etc/hosts").is_permission_denied());
    }

    #[test]
    fn display_includes_detail() {
        let err = SelfControlError::parse("expected value at line 1");
        assert_eq!(err.to_string(), "Parse error: expected value at line 1");
    }
}
