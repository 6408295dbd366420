//! Blocking session lifecycle
//!
//! A session is a wall-clock window. Nothing here reads the clock: callers
//! pass `now`, which keeps expiry decisions reproducible in tests and lets
//! both actors judge the same persisted session consistently.

use chrono::{DateTime, Local, TimeDelta};
use selfcontrol_store::SessionRecord;
use std::time::Duration;

/// Shortest session; keeps `end > start` for a zero-length request
pub const MIN_SESSION: Duration = Duration::from_secs(1);

/// Longest session accepted
pub const MAX_SESSION: Duration = Duration::from_secs(366 * 24 * 3600);

/// An active (or expired but not yet cleared) blocking window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,

    /// Display label, e.g. "5 minutes"
    pub label: String,
}

impl Session {
    /// Begin a session of `duration` at `now`.
    ///
    /// `duration` is clamped to [`MIN_SESSION`, `MAX_SESSION`].
    pub fn start(duration: Duration, label: impl Into<String>, now: DateTime<Local>) -> Self {
        let duration = duration.clamp(MIN_SESSION, MAX_SESSION);
        // In range by construction of MAX_SESSION
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);

        Self {
            start: now,
            end: now + delta,
            label: label.into(),
        }
    }

    /// True until `now` reaches the end time
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        now < self.end
    }

    /// Time left, or zero once expired
    pub fn remaining(&self, now: DateTime<Local>) -> Duration {
        if !self.is_active(now) {
            return Duration::ZERO;
        }
        (self.end - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Time since start, or zero if `now` precedes the start
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        (now - self.start).to_std().unwrap_or(Duration::ZERO)
    }

    /// Total planned length
    pub fn length(&self) -> Duration {
        (self.end - self.start).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Whether `session` exists and has not yet expired at `now`
pub fn is_active(session: Option<&Session>, now: DateTime<Local>) -> bool {
    session.is_some_and(|s| s.is_active(now))
}

/// Time left in `session` at `now`; zero when absent or expired
pub fn remaining(session: Option<&Session>, now: DateTime<Local>) -> Duration {
    session.map_or(Duration::ZERO, |s| s.remaining(now))
}

/// Time since `session` started; zero when absent
pub fn elapsed(session: Option<&Session>, now: DateTime<Local>) -> Duration {
    session.map_or(Duration::ZERO, |s| s.elapsed(now))
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            start: record.start_time,
            end: record.end_time,
            label: record.duration,
        }
    }
}

impl From<&SessionRecord> for Session {
    fn from(record: &SessionRecord) -> Self {
        Self::from(record.clone())
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        SessionRecord {
            end_time: session.end,
            duration: session.label,
            start_time: session.start,
        }
    }
}
