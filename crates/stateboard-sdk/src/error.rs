use stateboard_diff::DiffError;
use stateboard_store::StoreError;
use stateboard_types::Serial;
use thiserror::Error;

/// Failures of Stateboard operations.
///
/// Every failure is scoped to one request; none is fatal to the process.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The caller's version token is neither empty nor a non-negative integer.
    #[error("invalid version token: {0:?}")]
    InvalidVersionToken(String),

    #[error("state not found: {0}")]
    StateNotFound(String),

    #[error("snapshot not found: {state} serial {serial}")]
    SnapshotNotFound { state: String, serial: Serial },

    #[error("cannot compare snapshots of different states: {from:?} and {to:?}")]
    IncomparableSnapshots { from: String, to: String },

    /// Transport or store-level failure, passed through with its message.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for BoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StateNotFound(state) => Self::StateNotFound(state),
            StoreError::SnapshotNotFound { state, serial } => Self::SnapshotNotFound { state, serial },
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<DiffError> for BoardError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::IncomparableSnapshots { from, to } => Self::IncomparableSnapshots { from, to },
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
