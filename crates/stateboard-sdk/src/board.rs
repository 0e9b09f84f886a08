use std::sync::Arc;

use stateboard_diff::DiffResult;
use stateboard_store::SnapshotStore;
use stateboard_types::{Serial, Snapshot};

use crate::activity::{list_activity, Activity};
use crate::compare::compare_versions;
use crate::error::BoardResult;
use crate::resolver::resolve;

/// High-level Stateboard API.
///
/// Holds the store handle every operation reads through. Cheap to clone;
/// clones share the store.
#[derive(Clone)]
pub struct Stateboard {
    store: Arc<dyn SnapshotStore>,
}

impl Stateboard {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Wrap a concrete store.
    pub fn with_store(store: impl SnapshotStore + 'static) -> Self {
        Self::new(Arc::new(store))
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    // ---- Discovery ----

    /// Names of all known states, sorted.
    pub async fn list_states(&self) -> BoardResult<Vec<String>> {
        let mut states = self.store.list_states().await?;
        states.sort();
        states.dedup();
        Ok(states)
    }

    pub async fn list_activity(&self, state: &str) -> BoardResult<Activity> {
        list_activity(self.store(), state).await
    }

    // ---- Versions ----

    pub async fn resolve(&self, state: &str, token: &str) -> BoardResult<Serial> {
        resolve(self.store(), state, token).await
    }

    /// Resolve `token` and fetch that snapshot.
    pub async fn get_version(&self, state: &str, token: &str) -> BoardResult<Snapshot> {
        let serial = self.resolve(state, token).await?;
        let snapshot = self.store.fetch_snapshot(state, serial).await?;
        Ok(snapshot)
    }

    // ---- Comparison ----

    pub async fn compare_versions(
        &self,
        state: &str,
        from_token: &str,
        to_token: &str,
    ) -> BoardResult<DiffResult> {
        compare_versions(self.store(), state, from_token, to_token).await
    }
}

impl std::fmt::Debug for Stateboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stateboard").finish_non_exhaustive()
    }
}
