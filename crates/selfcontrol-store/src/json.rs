//! JSON file store implementation

use selfcontrol_util::CoordinationMode;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{PersistedState, StateGuard, StateLock, StateStore, StoreError, StoreResult};

/// The record is readable by the unprivileged control surface even when
/// the daemon (running as root) was the last writer.
const RECORD_MODE: u32 = 0o644;

/// Stores the record as pretty-printed JSON at a fixed path
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
    coordination: CoordinationMode,
}

impl JsonStateStore {
    /// Store at `path` without cross-actor locking
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_coordination(path, CoordinationMode::Simple)
    }

    pub fn with_coordination(path: impl Into<PathBuf>, coordination: CoordinationMode) -> Self {
        Self {
            path: path.into(),
            coordination,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar lock file next to the record
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Create the containing directory if needed
    fn ensure_dir(&self) -> StoreResult<PathBuf> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(dir)
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> StoreResult<PersistedState> {
        self.ensure_dir()?;

        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state record, starting empty");
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        serde_json::from_str(&data).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, state: &PersistedState) -> StoreResult<()> {
        let dir = self.ensure_dir()?;
        let json = serde_json::to_string_pretty(state)?;

        // Write beside the record and rename over it, so a reader never
        // observes a half-written file.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.write_all(b"\n"))
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(RECORD_MODE))
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            patterns = state.block_list.len(),
            session = state.active_session.is_some(),
            "State saved"
        );
        Ok(())
    }

    fn lock(&self) -> StoreResult<StateGuard> {
        match self.coordination {
            CoordinationMode::Simple => Ok(StateGuard::Unlocked),
            CoordinationMode::Locked(retry) => {
                self.ensure_dir()?;
                StateLock::acquire(self.lock_path(), retry).map(StateGuard::Locked)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockList, SessionRecord};
    use chrono::{Local, TimeZone};
    use selfcontrol_util::LockRetry;
    use std::time::Duration;

    fn sample_state() -> PersistedState {
        let start = Local.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        PersistedState {
            block_list: BlockList::from(vec!["example.com".to_string(), "*.linkedin.*".to_string()]),
            active_session: Some(SessionRecord {
                end_time: start + chrono::Duration::hours(1),
                duration: "1 hour".into(),
                start_time: start,
            }),
        }
    }

    #[test]
    fn fresh_environment_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested").join("state.json"));

        let state = store.load().unwrap();
        assert!(state.block_list.is_empty());
        assert!(state.active_session.is_none());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn save_overwrites_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        store.save(&PersistedState::default()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("active_session"));
        assert!(store.load().unwrap().block_list.is_empty());
    }

    #[test]
    fn saved_record_is_world_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        store.save(&sample_state()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, RECORD_MODE);
    }

    #[test]
    fn malformed_record_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonStateStore::new(&path).load();
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }

    #[test]
    fn unreadable_record_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the record should be
        let path = dir.path().join("state.json");
        fs::create_dir(&path).unwrap();

        let result = JsonStateStore::new(&path).load();
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn uncreatable_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let store = JsonStateStore::new(blocker.join("state.json"));
        assert!(matches!(store.load(), Err(StoreError::Io { .. })));
        assert!(matches!(
            store.save(&PersistedState::default()),
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn simple_mode_guard_is_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        let guard = store.lock().unwrap();
        assert!(!guard.is_locked());
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn locked_mode_excludes_second_actor() {
        let dir = tempfile::tempdir().unwrap();
        let retry = LockRetry {
            attempts: 2,
            delay: Duration::from_millis(1),
        };
        let path = dir.path().join("state.json");
        let daemon = JsonStateStore::with_coordination(&path, CoordinationMode::Locked(retry));
        let cli = JsonStateStore::with_coordination(&path, CoordinationMode::Locked(retry));

        let guard = daemon.lock().unwrap();
        assert!(guard.is_locked());
        assert!(matches!(cli.lock(), Err(StoreError::LockTimeout { .. })));

        drop(guard);
        assert!(cli.lock().unwrap().is_locked());
    }
}
