use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version token: {0:?}")]
    InvalidVersionToken(String),

    #[error("invalid resource key {key:?}: {reason}")]
    InvalidResourceKey { key: String, reason: String },
}
