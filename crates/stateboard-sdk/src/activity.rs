//! Activity listing: the chronological version history of a state.

use serde::{Serialize, Serializer};
use stateboard_store::SnapshotStore;
use stateboard_types::ActivityEntry;

use crate::error::{BoardError, BoardResult};

/// Version history of one state, ordered by serial ascending.
///
/// The ordering holds whatever order the store returned entries in. The
/// history can be iterated any number of times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    state: String,
    entries: Vec<ActivityEntry>,
}

impl Activity {
    /// Build a history from entries in any order.
    pub fn new(state: impl Into<String>, mut entries: Vec<ActivityEntry>) -> Self {
        entries.sort_by_key(|entry| entry.serial);
        Self {
            state: state.into(),
            entries,
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a Activity {
    type Item = &'a ActivityEntry;
    type IntoIter = std::slice::Iter<'a, ActivityEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Activity {
    type Item = ActivityEntry;
    type IntoIter = std::vec::IntoIter<ActivityEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Serialized as the bare list of entries.
impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// List the history of `state` from serial metadata only.
///
/// A state for which the store reports no versions is treated as unknown.
pub async fn list_activity(store: &dyn SnapshotStore, state: &str) -> BoardResult<Activity> {
    let entries = store.list_serials(state).await?;
    if entries.is_empty() {
        return Err(BoardError::StateNotFound(state.to_string()));
    }
    tracing::debug!(state, versions = entries.len(), "listed activity");
    Ok(Activity::new(state, entries))
}
