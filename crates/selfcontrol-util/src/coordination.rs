//! How the control surface and the enforcement daemon share files

use std::time::Duration;

/// Coordination between the two actors that rewrite the state record and
/// the hosts region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinationMode {
    /// No locking: each actor loads, mutates and overwrites independently.
    /// Last writer wins and a concurrent update can be lost.
    #[default]
    Simple,

    /// Every load-mutate-save cycle runs under an exclusive advisory lock
    /// on a sidecar lock file, acquired with bounded retry.
    Locked(LockRetry),
}

/// Bounded retry policy for acquiring the advisory lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRetry {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for LockRetry {
    fn default() -> Self {
        Self {
            attempts: 20,
            delay: Duration::from_millis(50),
        }
    }
}
