//! Hosts file engine
//!
//! Owns a marker-delimited region of the name-resolution override file:
//!
//! ```text
//! <existing file content>
//! # BEGIN SELFCONTROL-TUI
//! 127.0.0.1 example.com
//! ::1 example.com
//! # END SELFCONTROL-TUI
//! ```
//!
//! Everything outside the markers belongs to the system and is written
//! back unchanged. The file is rewritten in place so its inode, owner and
//! mode survive. A concurrent rewrite by the other actor can still be lost
//! between our read and write; see `CoordinationMode::Locked`.

use selfcontrol_util::SelfControlError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::expand_patterns;

pub const BEGIN_MARKER: &str = "# BEGIN SELFCONTROL-TUI";
pub const END_MARKER: &str = "# END SELFCONTROL-TUI";

const IPV4_LOOPBACK: &str = "127.0.0.1";
const IPV6_LOOPBACK: &str = "::1";

/// Hosts file errors
#[derive(Debug, Error)]
pub enum HostsError {
    #[error("Cannot write {path} (are you running as root?): {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HostsError {
    fn read(path: &Path, source: io::Error) -> Self {
        HostsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                HostsError::PermissionDenied { path, source }
            }
            _ => HostsError::Io { path, source },
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, HostsError::PermissionDenied { .. })
    }
}

impl From<HostsError> for SelfControlError {
    fn from(e: HostsError) -> Self {
        if e.is_permission_denied() {
            SelfControlError::permission(e.to_string())
        } else {
            SelfControlError::io(e.to_string())
        }
    }
}

pub type HostsResult<T> = Result<T, HostsError>;

/// Installs and removes the block region in a hosts file
#[derive(Debug, Clone)]
pub struct HostsEngine {
    path: PathBuf,
}

impl HostsEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace any existing region with one blocking every expansion of
    /// `patterns`. Returns the number of hostnames blocked.
    pub fn block<S: AsRef<str>>(&self, patterns: &[S]) -> HostsResult<usize> {
        self.unblock()?;

        let mut content = self.read()?;
        let hosts = expand_patterns(patterns);

        // A file without a final newline gets a separator before the
        // region, recorded by leaving the end marker unterminated.
        let terminated = content.is_empty() || content.ends_with('\n');
        if !terminated {
            content.push('\n');
        }
        content.push_str(&render_region(&hosts));
        if !terminated {
            content.pop();
        }

        self.write(&content)?;
        info!(
            path = %self.path.display(),
            patterns = patterns.len(),
            hosts = hosts.len(),
            "Block region installed"
        );
        Ok(hosts.len())
    }

    /// Remove every marker region. Returns whether anything was removed;
    /// the file is not touched when there is nothing to remove.
    pub fn unblock(&self) -> HostsResult<bool> {
        let content = self.read()?;

        match strip_region(&content) {
            Some(stripped) => {
                self.write(&stripped)?;
                info!(path = %self.path.display(), "Block region removed");
                Ok(true)
            }
            None => {
                debug!(path = %self.path.display(), "No block region present");
                Ok(false)
            }
        }
    }

    /// Whether the begin marker appears anywhere in the file
    pub fn is_blocked(&self) -> HostsResult<bool> {
        Ok(self.read()?.contains(BEGIN_MARKER))
    }

    fn read(&self) -> HostsResult<String> {
        fs::read_to_string(&self.path).map_err(|e| HostsError::read(&self.path, e))
    }

    fn write(&self, content: &str) -> HostsResult<()> {
        fs::write(&self.path, content).map_err(|e| HostsError::write(&self.path, e))
    }
}

/// Render the region for `hosts`, one IPv4 and one IPv6 line per host
pub fn render_region(hosts: &[String]) -> String {
    let mut region = String::new();
    region.push_str(BEGIN_MARKER);
    region.push('\n');
    for host in hosts {
        region.push_str(&format!("{IPV4_LOOPBACK} {host}\n"));
        region.push_str(&format!("{IPV6_LOOPBACK} {host}\n"));
    }
    region.push_str(END_MARKER);
    region.push('\n');
    region
}

/// Drop every line from a begin marker through the next end marker.
///
/// Returns `None` when no marker line is present. A stray end marker is
/// dropped on its own; an unterminated begin marker drops to end of file.
/// Kept lines are copied byte for byte, line endings included. An end
/// marker at end of file without a newline means [`HostsEngine::block`]
/// added a separator, which is removed again.
pub fn strip_region(content: &str) -> Option<String> {
    let mut kept = String::with_capacity(content.len());
    let mut in_region = false;
    let mut found = false;
    let mut added_separator = false;

    for line in content.split_inclusive('\n') {
        match line.trim() {
            BEGIN_MARKER => {
                in_region = true;
                found = true;
            }
            END_MARKER => {
                in_region = false;
                found = true;
                added_separator = !line.ends_with('\n');
            }
            _ if !in_region => kept.push_str(line),
            _ => {}
        }
    }

    if added_separator && kept.ends_with('\n') {
        kept.pop();
    }

    found.then_some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_HOSTS: &str = "127.0.0.1\tlocalhost\n::1 localhost ip6-localhost\n\n# custom\n10.0.0.2 nas.lan\n";

    fn engine_with(content: &str) -> (tempfile::TempDir, HostsEngine) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, content).unwrap();
        (dir, HostsEngine::new(path))
    }

    fn read(engine: &HostsEngine) -> String {
        fs::read_to_string(engine.path()).unwrap()
    }

    #[test]
    fn block_appends_region_in_expansion_order() {
        let (_dir, engine) = engine_with(SYSTEM_HOSTS);

        let count = engine.block(&["example.com"]).unwrap();
        assert_eq!(count, 2);

        let expected = format!(
            "{SYSTEM_HOSTS}{BEGIN_MARKER}\n\
             127.0.0.1 example.com\n\
             ::1 example.com\n\
             127.0.0.1 www.example.com\n\
             ::1 www.example.com\n\
             {END_MARKER}\n"
        );
        assert_eq!(read(&engine), expected);
        assert!(engine.is_blocked().unwrap());
    }

    #[test]
    fn block_then_unblock_restores_content() {
        let (_dir, engine) = engine_with(SYSTEM_HOSTS);

        engine.block(&["*.linkedin.*", "reddit.com"]).unwrap();
        assert!(engine.unblock().unwrap());

        assert_eq!(read(&engine), SYSTEM_HOSTS);
        assert!(!engine.is_blocked().unwrap());
    }

    #[test]
    fn unblock_is_idempotent() {
        let (_dir, engine) = engine_with(SYSTEM_HOSTS);
        engine.block(&["example.com"]).unwrap();

        engine.unblock().unwrap();
        let first = read(&engine);
        assert!(!engine.unblock().unwrap());
        assert_eq!(read(&engine), first);
    }

    #[test]
    fn unblock_without_region_is_noop() {
        let (_dir, engine) = engine_with(SYSTEM_HOSTS);
        assert!(!engine.unblock().unwrap());
        assert_eq!(read(&engine), SYSTEM_HOSTS);
    }

    #[test]
    fn block_replaces_stale_region() {
        let (_dir, engine) = engine_with(SYSTEM_HOSTS);
        engine.block(&["old.example"]).unwrap();
        engine.block(&["new.example"]).unwrap();

        let content = read(&engine);
        assert_eq!(content.matches(BEGIN_MARKER).count(), 1);
        assert!(!content.contains("old.example"));
        assert!(content.contains("127.0.0.1 new.example\n"));
    }

    #[test]
    fn block_separates_region_from_unterminated_last_line() {
        let (_dir, engine) = engine_with("127.0.0.1 localhost");
        engine.block(&["example.com"]).unwrap();

        let content = read(&engine);
        assert!(content.starts_with(&format!("127.0.0.1 localhost\n{BEGIN_MARKER}\n")));
        assert!(content.ends_with(&format!("::1 www.example.com\n{END_MARKER}")));
    }

    #[test]
    fn block_then_unblock_restores_file_without_final_newline() {
        let original = "127.0.0.1 localhost\n::1 localhost";
        let (_dir, engine) = engine_with(original);

        engine.block(&["example.com"]).unwrap();
        assert!(engine.is_blocked().unwrap());
        assert!(engine.unblock().unwrap());
        assert_eq!(read(&engine), original);

        // Re-blocking replaces the region without stacking separators
        engine.block(&["example.com"]).unwrap();
        engine.block(&["reddit.com"]).unwrap();
        engine.unblock().unwrap();
        assert_eq!(read(&engine), original);
    }

    #[test]
    fn block_then_unblock_restores_crlf_file_without_final_newline() {
        let original = "127.0.0.1 localhost\r\n::1 localhost";
        let (_dir, engine) = engine_with(original);

        engine.block(&["example.com"]).unwrap();
        engine.unblock().unwrap();
        assert_eq!(read(&engine), original);
    }

    #[test]
    fn block_on_empty_file() {
        let (_dir, engine) = engine_with("");
        engine.block(&["example.com"]).unwrap();
        assert!(read(&engine).starts_with(BEGIN_MARKER));

        engine.unblock().unwrap();
        assert_eq!(read(&engine), "");
    }

    #[test]
    fn strip_handles_multiple_regions() {
        let content = format!(
            "a\n{BEGIN_MARKER}\n127.0.0.1 x\n{END_MARKER}\nb\n  {BEGIN_MARKER}  \n::1 y\n{END_MARKER}\nc\n"
        );
        assert_eq!(strip_region(&content).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn strip_preserves_crlf_and_whitespace_outside_region() {
        let content = format!("a \r\n\tb\r\n{BEGIN_MARKER}\r\n::1 x\r\n{END_MARKER}\r\nc");
        assert_eq!(strip_region(&content).unwrap(), "a \r\n\tb\r\nc");
    }

    #[test]
    fn strip_drops_stray_end_marker() {
        let content = format!("a\n{END_MARKER}\nb\n");
        assert_eq!(strip_region(&content).unwrap(), "a\nb\n");
    }

    #[test]
    fn strip_unterminated_region_runs_to_eof() {
        let content = format!("a\n{BEGIN_MARKER}\n127.0.0.1 x\nb\n");
        assert_eq!(strip_region(&content).unwrap(), "a\n");
    }

    #[test]
    fn strip_ignores_marker_text_inside_line() {
        let content = format!("# note: {BEGIN_MARKER} is ours\n");
        assert!(strip_region(&content).is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = HostsEngine::new(dir.path().join("absent"));

        assert!(matches!(engine.unblock(), Err(HostsError::Io { .. })));
        assert!(matches!(engine.block(&["x.com"]), Err(HostsError::Io { .. })));
        assert!(matches!(engine.is_blocked(), Err(HostsError::Io { .. })));
    }

    #[test]
    fn write_errors_classified() {
        let path = Path::new("/etc/hosts");

        let denied = HostsError::write(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(denied.is_permission_denied());
        assert!(SelfControlError::from(denied).is_permission_denied());

        let other = HostsError::write(path, io::Error::from(io::ErrorKind::StorageFull));
        assert!(!other.is_permission_denied());
    }
}
