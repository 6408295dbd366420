//! Control surface operations
//!
//! The interactive side of selfcontrol. Every operation reloads the shared
//! record, applies one change, and saves it back, so edits made by the
//! daemon in between are picked up rather than overwritten wholesale.

use chrono::{DateTime, Local};
use selfcontrol_store::{PersistedState, SessionRecord, StateStore};
use selfcontrol_util::{Result, SelfControlError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::{expand_pattern, HostsEngine, HostsResult, Session};

/// Snapshot for display
#[derive(Debug, Clone)]
pub struct Status {
    pub patterns: Vec<String>,
    pub session: Option<Session>,

    /// Zero when no session is running
    pub remaining: Duration,

    /// Whether the hosts file currently carries our region
    pub hosts_blocked: bool,
}

impl Status {
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        crate::is_active(self.session.as_ref(), now)
    }
}

/// Drives the store and hosts engine on behalf of the user
pub struct Controller {
    store: Arc<dyn StateStore>,
    hosts: HostsEngine,

    /// Set after the first permission failure on the hosts file, so that
    /// later actions fail fast instead of retrying a write that cannot work
    hosts_write_denied: bool,
}

impl Controller {
    pub fn new(store: Arc<dyn StateStore>, hosts: HostsEngine) -> Self {
        Self {
            store,
            hosts,
            hosts_write_denied: false,
        }
    }

    pub fn hosts_write_denied(&self) -> bool {
        self.hosts_write_denied
    }

    /// Startup check: end a session that expired while nobody was looking.
    ///
    /// The daemon does the same on its next tick, but it may not be running
    /// yet.
    pub fn reconcile(&mut self, now: DateTime<Local>) -> Result<PersistedState> {
        let _guard = self.store.lock()?;
        let mut state = self.store.load()?;

        let expired = state
            .active_session
            .as_ref()
            .is_some_and(|record| !Session::from(record).is_active(now));

        if expired {
            info!("Found expired session at startup, unblocking");
            self.with_hosts(|hosts| hosts.unblock())?;
            state.clear_session();
            self.store.save(&state)?;
        }

        Ok(state)
    }

    /// Add a pattern to the block list. Returns false if it was already there.
    pub fn add_pattern(&self, pattern: &str) -> Result<bool> {
        let pattern = pattern.trim();
        if expand_pattern(pattern).is_empty() {
            return Err(SelfControlError::InvalidPattern(pattern.to_string()));
        }

        let _guard = self.store.lock()?;
        let mut state = self.store.load()?;
        if !state.block_list.add(pattern) {
            return Ok(false);
        }
        self.store.save(&state)?;

        info!(pattern, "Pattern added");
        Ok(true)
    }

    /// Remove patterns by zero-based position. Returns how many were removed.
    pub fn remove_patterns(&self, indices: &[usize]) -> Result<usize> {
        let _guard = self.store.lock()?;
        let mut state = self.store.load()?;

        let removed = state.block_list.remove(indices);
        if removed > 0 {
            self.store.save(&state)?;
            info!(removed, "Patterns removed");
        }
        Ok(removed)
    }

    /// Start blocking every pattern in the list for `duration`.
    ///
    /// Nothing is saved if the hosts file cannot be written, so a recorded
    /// session always has a region behind it.
    pub fn start_session(
        &mut self,
        duration: Duration,
        label: &str,
        now: DateTime<Local>,
    ) -> Result<Session> {
        let _guard = self.store.lock()?;
        let mut state = self.store.load()?;

        if let Some(record) = &state.active_session
            && Session::from(record).is_active(now)
        {
            return Err(SelfControlError::SessionAlreadyActive);
        }
        if state.block_list.is_empty() {
            return Err(SelfControlError::NoPatterns);
        }

        let session = Session::start(duration, label, now);
        let hosts = self.with_hosts(|hosts| hosts.block(state.block_list.as_slice()))?;

        state.active_session = Some(SessionRecord::from(session.clone()));
        self.store.save(&state)?;

        info!(
            label = %session.label,
            end_time = %session.end,
            hosts,
            "Blocking session started"
        );
        Ok(session)
    }

    pub fn status(&self, now: DateTime<Local>) -> Result<Status> {
        let state = self.store.load()?;
        let session = state.active_session.as_ref().map(Session::from);

        Ok(Status {
            patterns: state.block_list.as_slice().to_vec(),
            remaining: crate::remaining(session.as_ref(), now),
            session,
            hosts_blocked: self.hosts.is_blocked()?,
        })
    }

    fn with_hosts<T>(&mut self, op: impl FnOnce(&HostsEngine) -> HostsResult<T>) -> Result<T> {
        if self.hosts_write_denied {
            return Err(SelfControlError::permission(format!(
                "{} is not writable; restart with sufficient privileges",
                self.hosts.path().display()
            )));
        }

        op(&self.hosts).map_err(|e| {
            if e.is_permission_denied() {
                warn!(error = %e, "Hosts file not writable, further changes disabled");
                self.hosts_write_denied = true;
            }
            e.into()
        })
    }
}
