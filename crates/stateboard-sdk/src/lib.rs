//! High-level SDK for Stateboard.
//!
//! Composes a [`SnapshotStore`] with the diff engine to answer the three
//! questions operators ask about a state: "what does version N look like",
//! "what versions exist", and "what changed between version A and B".
//!
//! [`Stateboard`] is the entry point. It owns the store handle and is passed
//! explicitly to whatever serves requests; there is no global state.

pub mod activity;
pub mod board;
pub mod compare;
pub mod error;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use activity::{list_activity, Activity};
pub use board::Stateboard;
pub use compare::compare_versions;
pub use error::{BoardError, BoardResult};
pub use resolver::{latest_serial, resolve, resolve_token};

// Re-export key types
pub use stateboard_diff::{AttributeChange, ChangeKind, DiffResult, DiffSummary, LeafChange, ResourceChange};
pub use stateboard_store::{HttpSnapshotStore, InMemorySnapshotStore, SnapshotStore};
pub use stateboard_types::{
    ActivityEntry, AttributeValue, Resource, ResourceKey, Serial, Snapshot, VersionToken,
};
