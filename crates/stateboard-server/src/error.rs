use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use stateboard_sdk::BoardError;
use stateboard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Board(BoardError::InvalidVersionToken(_))
            | Self::Board(BoardError::IncomparableSnapshots { .. }) => StatusCode::BAD_REQUEST,
            Self::Board(BoardError::StateNotFound(_))
            | Self::Board(BoardError::SnapshotNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Board(BoardError::StoreUnavailable(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message for the `error` field of a JSON error body.
    fn summary(&self) -> &'static str {
        match self {
            Self::Board(BoardError::InvalidVersionToken(_)) => "Invalid version",
            Self::Board(BoardError::IncomparableSnapshots { .. }) => "Versions are not comparable",
            Self::Board(BoardError::StateNotFound(_)) => "State not found",
            Self::Board(BoardError::SnapshotNotFound { .. }) => "Version not found",
            Self::Board(BoardError::StoreUnavailable(_)) => "State store unavailable",
            Self::Store(_) => "State store error",
            Self::Config(_) => "Configuration error",
            Self::Io(_) | Self::Internal(_) => "Internal error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = Json(json!({
            "error": self.summary(),
            "details": self.to_string(),
        }));
        (status, body).into_response()
    }
}
