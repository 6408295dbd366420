//! Shared utilities for selfcontrol
//!
//! This crate provides:
//! - Actor coordination modes
//! - Error taxonomy shared by the daemon and the control surface
//! - Time utilities (wall clock with mock support, duration helpers)
//! - Preset blocking durations
//! - Default paths for the state record, config file, and hosts file

mod coordination;
mod error;
mod paths;
mod time;

pub use coordination::*;
pub use error::*;
pub use paths::*;
pub use time::*;
