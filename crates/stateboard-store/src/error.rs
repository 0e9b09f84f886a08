use stateboard_types::Serial;

/// Errors from snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store knows no state by this name.
    #[error("state not found: {0}")]
    StateNotFound(String),

    /// The state exists but has no snapshot with this serial.
    #[error("snapshot not found: {state} serial {serial}")]
    SnapshotNotFound { state: String, serial: Serial },

    /// A snapshot with this serial is already stored for the state.
    #[error("duplicate serial {serial} for state {state}")]
    DuplicateSerial { state: String, serial: Serial },

    /// A state document could not be decoded.
    #[error("cannot decode state {state}: {reason}")]
    Decode { state: String, reason: String },

    /// Transport or backend failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error while reading local state files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
