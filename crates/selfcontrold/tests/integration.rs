//! Integration tests for selfcontrold
//!
//! These drive the control surface and the enforcer against the same state
//! record and hosts file, the way the two processes share them on a real
//! system.

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use selfcontrol_config::parse_config;
use selfcontrol_core::{Controller, Enforcer, HostsEngine, TickOutcome, BEGIN_MARKER, END_MARKER};
use selfcontrol_store::{JsonStateStore, StateStore};
use selfcontrol_util::{CoordinationMode, LockRetry, SelfControlError};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

const SYSTEM_HOSTS: &str = "127.0.0.1 localhost\n::1 localhost\n";

fn t0() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, 2, 8, 30, 0).unwrap()
}

struct Machine {
    _dir: tempfile::TempDir,
    store: Arc<JsonStateStore>,
    hosts: HostsEngine,
}

impl Machine {
    fn new(coordination: CoordinationMode) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let hosts_path = dir.path().join("hosts");
        fs::write(&hosts_path, SYSTEM_HOSTS).unwrap();

        let store = Arc::new(JsonStateStore::with_coordination(
            dir.path().join("selfcontrol-tui").join("state.json"),
            coordination,
        ));

        Self {
            hosts: HostsEngine::new(hosts_path),
            store,
            _dir: dir,
        }
    }

    fn controller(&self) -> Controller {
        Controller::new(self.store.clone(), self.hosts.clone())
    }

    fn enforcer(&self) -> Enforcer {
        Enforcer::new(self.store.clone(), self.hosts.clone())
    }

    fn hosts_content(&self) -> String {
        fs::read_to_string(self.hosts.path()).unwrap()
    }

    /// The record as the other process would see it on disk
    fn state_json(&self) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(self.store.path()).unwrap()).unwrap()
    }
}

#[test]
fn test_five_minute_session_end_to_end() {
    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();
    let enforcer = machine.enforcer();

    controller.reconcile(t0()).unwrap();
    assert!(controller.add_pattern("example.com").unwrap());

    let session = controller
        .start_session(Duration::from_secs(300), "5 minutes", t0())
        .unwrap();
    assert_eq!(session.end, t0() + TimeDelta::minutes(5));

    let region = format!(
        "{BEGIN_MARKER}\n\
         127.0.0.1 example.com\n\
         ::1 example.com\n\
         127.0.0.1 www.example.com\n\
         ::1 www.example.com\n\
         {END_MARKER}\n"
    );
    assert_eq!(machine.hosts_content(), format!("{SYSTEM_HOSTS}{region}"));
    let record = machine.state_json();
    assert_eq!(record["urls"], serde_json::json!(["example.com"]));
    assert_eq!(record["active_session"]["duration"], "5 minutes");

    // Daemon ticks while the session runs
    let outcome = enforcer.tick(t0() + TimeDelta::minutes(4));
    assert_eq!(
        outcome,
        TickOutcome::Active {
            remaining: Duration::from_secs(60)
        }
    );
    assert_eq!(machine.hosts_content(), format!("{SYSTEM_HOSTS}{region}"));

    // First tick past the end time
    let outcome = enforcer.tick(t0() + TimeDelta::minutes(5) + TimeDelta::seconds(10));
    assert!(matches!(outcome, TickOutcome::Ended { .. }));
    assert_eq!(machine.hosts_content(), SYSTEM_HOSTS);

    let state = machine.store.load().unwrap();
    assert!(state.active_session.is_none());
    assert_eq!(state.block_list.as_slice(), ["example.com"]);
    assert!(machine.state_json().get("active_session").is_none());
}

#[test]
fn test_wildcard_pattern_blocks_expansions() {
    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();

    controller.add_pattern("*.linkedin.*").unwrap();
    controller
        .start_session(Duration::from_secs(60), "1 minute", t0())
        .unwrap();

    let content = machine.hosts_content();
    for host in [
        "linkedin",
        "www.linkedin",
        "m.linkedin",
        "account.linkedin",
        "linkedin.com",
        "www.linkedin.io",
    ] {
        assert!(content.contains(&format!("127.0.0.1 {host}\n")), "{host}");
        assert!(content.contains(&format!("::1 {host}\n")), "{host}");
    }
    assert!(!content.contains('*'));
}

#[test]
fn test_fresh_environment() {
    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();

    let state = controller.reconcile(t0()).unwrap();
    assert!(state.block_list.is_empty());
    assert!(state.active_session.is_none());

    let status = controller.status(t0()).unwrap();
    assert!(!status.hosts_blocked);
    assert!(!machine.store.path().exists());

    assert_eq!(machine.enforcer().tick(t0()), TickOutcome::NoSession);
    assert_eq!(machine.hosts_content(), SYSTEM_HOSTS);
}

#[test]
fn test_daemon_restart_ends_overdue_session() {
    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();
    controller.add_pattern("reddit.com").unwrap();
    controller
        .start_session(Duration::from_secs(60), "1 minute", t0())
        .unwrap();

    // A fresh enforcer, hours later, cleans up on its first tick
    let outcome = machine.enforcer().tick(t0() + TimeDelta::hours(3));
    assert!(matches!(outcome, TickOutcome::Ended { .. }));
    assert_eq!(machine.hosts_content(), SYSTEM_HOSTS);
}

#[test]
fn test_pattern_edits_during_session_survive_expiry() {
    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();
    controller.add_pattern("example.com").unwrap();
    controller
        .start_session(Duration::from_secs(60), "1 minute", t0())
        .unwrap();

    // Edits between daemon ticks are reloaded, not overwritten
    controller.add_pattern("news.ycombinator.com").unwrap();
    machine.enforcer().tick(t0() + TimeDelta::minutes(2));

    let state = machine.store.load().unwrap();
    assert_eq!(
        state.block_list.as_slice(),
        ["example.com", "news.ycombinator.com"]
    );
    assert!(state.active_session.is_none());
}

#[test]
fn test_locked_coordination_end_to_end() {
    let machine = Machine::new(CoordinationMode::Locked(LockRetry {
        attempts: 3,
        delay: Duration::from_millis(5),
    }));
    let mut controller = machine.controller();

    controller.add_pattern("example.com").unwrap();
    controller
        .start_session(Duration::from_secs(30), "30 seconds", t0())
        .unwrap();

    // Holding the lock stalls the daemon without damaging anything
    let guard = machine.store.lock().unwrap();
    assert!(guard.is_locked());
    let outcome = machine.enforcer().tick(t0() + TimeDelta::minutes(1));
    assert!(matches!(outcome, TickOutcome::LockFailed { .. }));
    assert!(machine.hosts_content().contains(BEGIN_MARKER));
    drop(guard);

    let outcome = machine.enforcer().tick(t0() + TimeDelta::minutes(1));
    assert!(matches!(outcome, TickOutcome::Ended { .. }));
    assert_eq!(machine.hosts_content(), SYSTEM_HOSTS);
}

#[test]
fn test_config_drives_coordination() {
    let settings = parse_config(
        r#"
        config_version = 1

        [daemon]
        poll_interval_seconds = 2
        coordination = "locked"
        lock_retry_attempts = 4
        "#,
    )
    .unwrap();

    assert_eq!(settings.daemon.poll_interval, Duration::from_secs(2));
    match settings.daemon.coordination {
        CoordinationMode::Locked(retry) => assert_eq!(retry.attempts, 4),
        other => panic!("expected locked mode, got {other:?}"),
    }
}

#[test]
fn test_unwritable_hosts_reports_permission() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores file modes, so there is nothing to observe
    if nix::unistd::geteuid().is_root() {
        return;
    }

    let machine = Machine::new(CoordinationMode::Simple);
    let mut controller = machine.controller();
    controller.add_pattern("example.com").unwrap();

    fs::set_permissions(machine.hosts.path(), fs::Permissions::from_mode(0o444)).unwrap();
    let result = controller.start_session(Duration::from_secs(60), "1 minute", t0());
    assert!(matches!(result, Err(SelfControlError::PermissionDenied(_))));
    assert!(controller.hosts_write_denied());
    assert!(machine.store.load().unwrap().active_session.is_none());

    // Later actions fail fast
    let result = controller.start_session(Duration::from_secs(60), "1 minute", t0());
    assert!(matches!(result, Err(SelfControlError::PermissionDenied(_))));
}
