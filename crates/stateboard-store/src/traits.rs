use async_trait::async_trait;
use stateboard_types::{ActivityEntry, Serial, Snapshot};

use crate::error::StoreResult;

/// Read access to a store of state snapshots.
///
/// All implementations must satisfy these invariants:
/// - Snapshots are immutable: the same `(state, serial)` always yields the
///   same document.
/// - Reads are safe to run concurrently.
/// - Errors distinguish an unknown state ([`StateNotFound`]) from an unknown
///   serial of a known state ([`SnapshotNotFound`]).
///
/// [`StateNotFound`]: crate::StoreError::StateNotFound
/// [`SnapshotNotFound`]: crate::StoreError::SnapshotNotFound
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Names of all known states.
    async fn list_states(&self) -> StoreResult<Vec<String>>;

    /// Fetch the full snapshot of `state` at `serial`.
    async fn fetch_snapshot(&self, state: &str, serial: Serial) -> StoreResult<Snapshot>;

    /// Lightweight history of `state`, in no particular order.
    async fn list_serials(&self, state: &str) -> StoreResult<Vec<ActivityEntry>>;
}
