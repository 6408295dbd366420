//! Blocking engine for selfcontrol
//!
//! This crate is the heart of selfcontrol, containing:
//! - Pattern expansion (user pattern -> concrete hostnames)
//! - The hosts engine (marker-delimited region in the override file)
//! - Session lifecycle against wall-clock time
//! - The enforcement loop run by the daemon
//! - The controller used by the interactive control surface

mod control;
mod enforcer;
mod expand;
mod hosts;
mod session;

pub use control::*;
pub use enforcer::*;
pub use expand::*;
pub use hosts::*;
pub use session::*;
