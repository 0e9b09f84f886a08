//! Snapshot store clients for Stateboard.
//!
//! Stateboard never writes state. Everything it knows about a state's history
//! comes through the [`SnapshotStore`] trait, which exposes the two reads the
//! comparison core needs (full snapshot by serial, lightweight serial list)
//! plus a state listing.
//!
//! # Storage Backends
//!
//! - [`InMemorySnapshotStore`] -- map-backed store for tests and embedding;
//!   can be populated from a directory of `.tfstate` files
//! - [`HttpSnapshotStore`] -- client for a remote state-storage service
//!
//! # Design Rules
//!
//! 1. Snapshots are immutable once stored; a serial is never reused within a state.
//! 2. Reads are safe to issue concurrently.
//! 3. "Latest" is resolved by callers from [`SnapshotStore::list_serials`]; the
//!    store is always asked for an explicit serial.
//! 4. Transport failures are surfaced as [`StoreError::Unavailable`] with context,
//!    never swallowed.

pub mod error;
pub mod http;
pub mod memory;
pub mod tfstate;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use http::HttpSnapshotStore;
pub use memory::InMemorySnapshotStore;
pub use tfstate::{decode_tfstate, decode_tfstate_value};
pub use traits::SnapshotStore;
