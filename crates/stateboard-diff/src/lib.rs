//! Diff engine for Stateboard.
//!
//! Compares two snapshots of the same state and produces a deterministic,
//! structured change set. Resources are matched by [`ResourceKey`]; matched
//! resources are compared attribute by attribute using structural equality.
//! Unchanged resources and attributes never appear in the output.
//!
//! # Key Types
//!
//! - [`DiffResult`] -- Full comparison of two snapshots, ordered by resource key
//! - [`ResourceChange`] -- Added / removed / modified resource
//! - [`AttributeChange`] -- Added / removed / modified attribute of a modified resource
//! - [`LeafChange`] -- Nested path inside an attribute that differs
//!
//! [`ResourceKey`]: stateboard_types::ResourceKey

pub mod compare;
pub mod error;
pub mod leaf;

pub use compare::{
    compare, diff_attributes, AttributeChange, ChangeKind, DiffResult, DiffSummary,
    ResourceChange,
};
pub use error::{DiffError, Result};
pub use leaf::LeafChange;
