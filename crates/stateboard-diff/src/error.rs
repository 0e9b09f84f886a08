//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// The two snapshots belong to different states.
    #[error("cannot compare snapshots of different states: {from:?} and {to:?}")]
    IncomparableSnapshots { from: String, to: String },
}

/// Convenience alias for diff results.
pub type Result<T> = std::result::Result<T, DiffError>;
