//! Expiry enforcement
//!
//! The daemon's only job: every tick, reload the shared record and, once
//! the session has run out, remove the block region and clear the
//! session. Every failure is logged and retried on the next tick.

use chrono::{DateTime, Local};
use selfcontrol_store::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{HostsEngine, Session};

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session in the record
    NoSession,

    /// Session still running
    Active { remaining: Duration },

    /// Session had expired; hosts region removed and record saved
    Ended { end_time: DateTime<Local> },

    /// Hosts region removed but the cleared record could not be saved.
    /// The next tick sees the stale session and unblocks again (a no-op).
    SaveFailed { end_time: DateTime<Local>, error: String },

    /// Hosts region could not be removed; the session is left in place
    UnblockFailed { error: String },

    LoadFailed { error: String },

    LockFailed { error: String },
}

/// Background actor that ends expired sessions
#[derive(Clone)]
pub struct Enforcer {
    store: Arc<dyn StateStore>,
    hosts: HostsEngine,
}

impl Enforcer {
    pub fn new(store: Arc<dyn StateStore>, hosts: HostsEngine) -> Self {
        Self { store, hosts }
    }

    /// Run one expiry check against `now`
    pub fn tick(&self, now: DateTime<Local>) -> TickOutcome {
        let _guard = match self.store.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, "Could not lock state, skipping tick");
                return TickOutcome::LockFailed {
                    error: e.to_string(),
                };
            }
        };

        let mut state = match self.store.load() {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Error loading state");
                return TickOutcome::LoadFailed {
                    error: e.to_string(),
                };
            }
        };

        let Some(session) = state.active_session.as_ref().map(Session::from) else {
            debug!("No active session");
            return TickOutcome::NoSession;
        };

        if session.is_active(now) {
            debug!(remaining = ?session.remaining(now), "Session active");
            return TickOutcome::Active {
                remaining: session.remaining(now),
            };
        }

        info!(
            end_time = %session.end,
            label = %session.label,
            "Session expired, unblocking"
        );

        // The session must outlive a failed unblock so that a cleared
        // session always means a cleared hosts region.
        if let Err(e) = self.hosts.unblock() {
            error!(error = %e, "Error unblocking");
            return TickOutcome::UnblockFailed {
                error: e.to_string(),
            };
        }

        state.clear_session();
        if let Err(e) = self.store.save(&state) {
            error!(error = %e, "Error saving state");
            return TickOutcome::SaveFailed {
                end_time: session.end,
                error: e.to_string(),
            };
        }

        info!("Successfully unblocked websites");
        TickOutcome::Ended {
            end_time: session.end,
        }
    }

    /// Tick every `period` until the task is dropped.
    ///
    /// The first check happens immediately so a session that expired while
    /// the daemon was down is ended at startup. Ticks do blocking file I/O
    /// and may sleep between lock retries, so each one runs on the blocking
    /// pool.
    pub async fn run(&self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period = ?period, hosts = %self.hosts.path().display(), "Monitoring for expired sessions");

        loop {
            interval.tick().await;

            let enforcer = self.clone();
            let outcome =
                tokio::task::spawn_blocking(move || enforcer.tick(selfcontrol_util::now())).await;
            if let Err(e) = outcome {
                error!(error = %e, "Tick task failed");
            }
        }
    }
}
