//! Advisory lock shared by the control surface and the daemon

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use selfcontrol_util::LockRetry;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::{StoreError, StoreResult};

/// Exclusive `flock` on a sidecar file. Dropping it releases the lock.
pub struct StateLock {
    path: PathBuf,
    _flock: Flock<File>,
}

impl StateLock {
    /// Try to take the lock, sleeping `retry.delay` between attempts.
    ///
    /// Blocks the calling thread; async callers run it off the runtime.
    pub fn acquire(path: impl AsRef<Path>, retry: LockRetry) -> StoreResult<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;

        for attempt in 1..=retry.attempts {
            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(flock) => {
                    trace!(path = %path.display(), attempt, "State lock acquired");
                    return Ok(Self {
                        path: path.to_path_buf(),
                        _flock: flock,
                    });
                }
                Err((unlocked, errno)) if errno == Errno::EWOULDBLOCK => {
                    debug!(path = %path.display(), attempt, "State lock busy");
                    file = unlocked;
                    if attempt < retry.attempts {
                        std::thread::sleep(retry.delay);
                    }
                }
                Err((_, errno)) => {
                    return Err(StoreError::io(path, std::io::Error::from(errno)));
                }
            }
        }

        Err(StoreError::LockTimeout {
            path: path.to_path_buf(),
            attempts: retry.attempts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for StateLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateLock").field("path", &self.path).finish()
    }
}
