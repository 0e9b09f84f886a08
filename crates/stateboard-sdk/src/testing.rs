//! Store double for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use stateboard_store::{SnapshotStore, StoreError, StoreResult};
use stateboard_types::{ActivityEntry, Serial, Snapshot};
use tokio::sync::Barrier;

/// Returns serials in the order they were scripted and counts calls.
pub(crate) struct ScriptedStore {
    order: HashMap<String, Vec<Serial>>,
    snapshots: HashMap<(String, Serial), Snapshot>,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    fetch_barrier: Option<Barrier>,
    fetch_failure: Option<String>,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self {
            order: HashMap::new(),
            snapshots: HashMap::new(),
            list_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            fetch_barrier: None,
            fetch_failure: None,
        }
    }

    /// A state whose versions are empty snapshots with the given serials.
    pub(crate) fn with_serials(state: &str, serials: &[u64]) -> Self {
        let mut store = Self::new();
        store.order.insert(state.to_string(), Vec::new());
        for &serial in serials {
            store.push(Snapshot::new(state, Serial::new(serial), at(serial)));
        }
        store
    }

    pub(crate) fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.push(snapshot);
        self
    }

    /// Make every fetch wait until two fetches are in flight.
    pub(crate) fn with_fetch_barrier(mut self) -> Self {
        self.fetch_barrier = Some(Barrier::new(2));
        self
    }

    pub(crate) fn with_fetch_failure(mut self, message: &str) -> Self {
        self.fetch_failure = Some(message.to_string());
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.order
            .entry(snapshot.state.clone())
            .or_default()
            .push(snapshot.serial);
        self.snapshots
            .insert((snapshot.state.clone(), snapshot.serial), snapshot);
    }
}

pub(crate) fn at(serial: u64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + serial as i64 * 60, 0)
        .single()
        .unwrap()
}

#[async_trait]
impl SnapshotStore for ScriptedStore {
    async fn list_states(&self) -> StoreResult<Vec<String>> {
        Ok(self.order.keys().cloned().collect())
    }

    async fn fetch_snapshot(&self, state: &str, serial: Serial) -> StoreResult<Snapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.fetch_barrier {
            barrier.wait().await;
        }
        if let Some(message) = &self.fetch_failure {
            return Err(StoreError::Unavailable(message.clone()));
        }
        if !self.order.contains_key(state) {
            return Err(StoreError::StateNotFound(state.to_string()));
        }
        self.snapshots
            .get(&(state.to_string(), serial))
            .cloned()
            .ok_or_else(|| StoreError::SnapshotNotFound {
                state: state.to_string(),
                serial,
            })
    }

    async fn list_serials(&self, state: &str) -> StoreResult<Vec<ActivityEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let serials = self
            .order
            .get(state)
            .ok_or_else(|| StoreError::StateNotFound(state.to_string()))?;
        Ok(serials
            .iter()
            .map(|&serial| ActivityEntry::new(serial, at(serial.get())))
            .collect())
    }
}
