//! The persisted record

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Everything the two actors share. Written whole on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Patterns to block, in display order
    #[serde(rename = "urls", default, deserialize_with = "null_as_empty")]
    pub block_list: BlockList,

    /// Present only while a session exists (possibly already expired)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session: Option<SessionRecord>,
}

impl PersistedState {
    /// Drop the session, returning it if there was one
    pub fn clear_session(&mut self) -> Option<SessionRecord> {
        self.active_session.take()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BlockList, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BlockList>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Serialized form of a blocking session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub end_time: DateTime<Local>,

    /// Human-readable label chosen at start, e.g. "1 hour"
    pub duration: String,

    pub start_time: DateTime<Local>,
}

/// Ordered list of user patterns, unique by exact string match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockList(Vec<String>);

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `pattern` unless an identical entry exists.
    /// Returns whether the list changed.
    pub fn add(&mut self, pattern: impl Into<String>) -> bool {
        let pattern = pattern.into();
        if self.0.contains(&pattern) {
            return false;
        }
        self.0.push(pattern);
        true
    }

    /// Remove the entries at the given zero-based positions.
    ///
    /// Positions refer to the list as it was before the call. Out-of-range
    /// and repeated positions are ignored. Returns how many entries were
    /// removed.
    pub fn remove(&mut self, indices: &[usize]) -> usize {
        let doomed: HashSet<usize> = indices.iter().copied().collect();
        let before = self.0.len();

        let mut position = 0;
        self.0.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });

        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for BlockList {
    /// Builds a list through `add`, so duplicates collapse to their first occurrence
    fn from(patterns: Vec<String>) -> Self {
        let mut list = BlockList::new();
        for pattern in patterns {
            list.add(pattern);
        }
        list
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
