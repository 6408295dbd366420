//! Persistence layer for selfcontrol
//!
//! Provides:
//! - The persisted record shared by the control surface and the daemon
//! - Block list editing (ordered, exact-match unique)
//! - A JSON file store with atomic replacement
//! - An optional advisory lock around load-mutate-save cycles

mod json;
mod lock;
mod state;
mod traits;

pub use json::*;
pub use lock::*;
pub use state::*;
pub use traits::*;

use selfcontrol_util::SelfControlError;
use std::path::PathBuf;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record exists but is not a valid state document
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock {path} still held after {attempts} attempts")]
    LockTimeout { path: PathBuf, attempts: u32 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for SelfControlError {
    fn from(e: StoreError) -> Self {
        match &e {
            StoreError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                SelfControlError::permission(e.to_string())
            }
            StoreError::Io { .. } | StoreError::Serialization(_) => {
                SelfControlError::io(e.to_string())
            }
            StoreError::Parse { .. } => SelfControlError::parse(e.to_string()),
            StoreError::LockTimeout { .. } => SelfControlError::LockTimeout(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
