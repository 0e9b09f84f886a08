//! Foundation types for Stateboard.
//!
//! This crate provides the identity, ordering, and document types shared by
//! every other Stateboard crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`Serial`] - Monotonic version number of a snapshot within one state
//! - [`VersionToken`] - Caller-supplied version selector (`Latest` or a serial)
//! - [`ResourceKey`] - Terraform-style resource address (`module.x.aws_instance.web[0]`)
//! - [`AttributeValue`] - Tagged JSON-like attribute tree
//! - [`Snapshot`] / [`Resource`] - Immutable point-in-time capture of a state
//! - [`ActivityEntry`] - Lightweight `{serial, last_modified}` history record

pub mod error;
pub mod key;
pub mod serial;
pub mod snapshot;
pub mod value;

pub use error::TypeError;
pub use key::{ResourceIndex, ResourceKey, ResourceMode};
pub use serial::{Serial, VersionToken};
pub use snapshot::{ActivityEntry, Attributes, Resource, Snapshot, VersionSummary};
pub use value::AttributeValue;
