use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stateboard_types::{ActivityEntry, Serial, Snapshot};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::tfstate::decode_tfstate;
use crate::traits::SnapshotStore;

/// In-memory snapshot store.
///
/// Intended for tests, embedding, and serving a local directory of state
/// files. Snapshots are held behind a `RwLock` and cloned on read.
pub struct InMemorySnapshotStore {
    states: RwLock<BTreeMap<String, BTreeMap<Serial, Snapshot>>>,
}

impl InMemorySnapshotStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            states: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store a snapshot under its own state name and serial.
    ///
    /// Snapshots are immutable, so a second snapshot with an already stored
    /// serial is rejected.
    pub fn insert(&self, snapshot: Snapshot) -> StoreResult<()> {
        let mut states = self.states.write().map_err(poisoned)?;
        let versions = states.entry(snapshot.state.clone()).or_default();
        if versions.contains_key(&snapshot.serial) {
            return Err(StoreError::DuplicateSerial {
                state: snapshot.state,
                serial: snapshot.serial,
            });
        }
        versions.insert(snapshot.serial, snapshot);
        Ok(())
    }

    /// Build a store from a directory tree of `.tfstate` files.
    ///
    /// Every file is one version. Its state name is the path of its parent
    /// directory relative to `root` (files directly under `root` use their
    /// file stem), its serial comes from the document, and its last-modified
    /// time from the file's mtime.
    pub fn load_dir(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref();
        let store = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("tfstate")
            {
                continue;
            }

            let state = state_name_for(root, path);
            let bytes = std::fs::read(path)?;
            let metadata = entry.metadata().map_err(|e| StoreError::Io(e.into()))?;
            let last_modified: DateTime<Utc> = metadata.modified()?.into();
            let snapshot = decode_tfstate(&state, last_modified, &bytes)?;
            tracing::debug!(
                state = %state,
                serial = %snapshot.serial,
                path = %path.display(),
                "loaded state file"
            );
            store.insert(snapshot)?;
        }
        Ok(store)
    }

    /// Number of stored snapshots across all states.
    pub fn len(&self) -> usize {
        self.states
            .read()
            .map(|states| states.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    /// Returns `true` if the store holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn state_name_for(root: &Path, file: &Path) -> String {
    let parent = file
        .parent()
        .and_then(|p| p.strip_prefix(root).ok())
        .filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(dir) => dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn list_states(&self) -> StoreResult<Vec<String>> {
        let states = self.states.read().map_err(poisoned)?;
        Ok(states.keys().cloned().collect())
    }

    async fn fetch_snapshot(&self, state: &str, serial: Serial) -> StoreResult<Snapshot> {
        let states = self.states.read().map_err(poisoned)?;
        let versions = states
            .get(state)
            .ok_or_else(|| StoreError::StateNotFound(state.to_string()))?;
        versions
            .get(&serial)
            .cloned()
            .ok_or_else(|| StoreError::SnapshotNotFound {
                state: state.to_string(),
                serial,
            })
    }

    async fn list_serials(&self, state: &str) -> StoreResult<Vec<ActivityEntry>> {
        let states = self.states.read().map_err(poisoned)?;
        let versions = states
            .get(state)
            .ok_or_else(|| StoreError::StateNotFound(state.to_string()))?;
        Ok(versions.values().map(Snapshot::activity_entry).collect())
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotStore")
            .field("snapshot_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn snap(state: &str, serial: u64) -> Snapshot {
        let at = Utc.timestamp_opt(serial as i64 * 60, 0).single().unwrap();
        Snapshot::new(state, Serial::new(serial), at)
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let store = InMemorySnapshotStore::new();
        store.insert(snap("net", 1)).unwrap();
        store.insert(snap("net", 2)).unwrap();

        let fetched = store.fetch_snapshot("net", Serial::new(2)).await.unwrap();
        assert_eq!(fetched.serial, Serial::new(2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn unknown_state_and_serial_are_distinct_errors() {
        let store = InMemorySnapshotStore::new();
        store.insert(snap("net", 1)).unwrap();

        let err = store.fetch_snapshot("nope", Serial::new(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::StateNotFound(name) if name == "nope"));

        let err = store.fetch_snapshot("net", Serial::new(9)).await.unwrap_err();
        assert!(matches!(err, StoreError::SnapshotNotFound { serial, .. } if serial == Serial::new(9)));

        let err = store.list_serials("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::StateNotFound(_)));
    }

    #[test]
    fn duplicate_serial_rejected() {
        let store = InMemorySnapshotStore::new();
        store.insert(snap("net", 1)).unwrap();
        let err = store.insert(snap("net", 1)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSerial { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_states_sorted() {
        let store = InMemorySnapshotStore::new();
        store.insert(snap("zeta", 1)).unwrap();
        store.insert(snap("alpha", 1)).unwrap();
        assert_eq!(store.list_states().await.unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn list_serials_returns_metadata() {
        let store = InMemorySnapshotStore::new();
        store.insert(snap("net", 3)).unwrap();
        store.insert(snap("net", 1)).unwrap();
        let serials: Vec<u64> = store
            .list_serials("net")
            .await
            .unwrap()
            .iter()
            .map(|e| e.serial.get())
            .collect();
        assert_eq!(serials.len(), 2);
        assert!(serials.contains(&1) && serials.contains(&3));
    }

    #[tokio::test]
    async fn load_dir_groups_files_by_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("prod").join("network");
        std::fs::create_dir_all(&state_dir).unwrap();

        for serial in [1, 2] {
            let doc = json!({
                "version": 4,
                "terraform_version": "1.6.0",
                "serial": serial,
                "resources": [{
                    "mode": "managed",
                    "type": "aws_vpc",
                    "name": "main",
                    "instances": [{"attributes": {"cidr_block": format!("10.{serial}.0.0/16")}}]
                }]
            });
            std::fs::write(
                state_dir.join(format!("{serial}.tfstate")),
                serde_json::to_vec(&doc).unwrap(),
            )
            .unwrap();
        }
        std::fs::write(
            dir.path().join("standalone.tfstate"),
            serde_json::to_vec(&json!({"version": 4, "serial": 7, "resources": []})).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let store = InMemorySnapshotStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.list_states().await.unwrap(),
            vec!["prod/network", "standalone"]
        );
        let snap = store.fetch_snapshot("prod/network", Serial::new(2)).await.unwrap();
        assert_eq!(snap.tool_version, "1.6.0");
        assert_eq!(snap.resources.len(), 1);
    }

    #[test]
    fn load_dir_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.tfstate"), "{").unwrap();
        let err = InMemorySnapshotStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
