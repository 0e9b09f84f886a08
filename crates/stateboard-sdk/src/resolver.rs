//! Version resolution: turn a caller's version token into a concrete serial.

use stateboard_store::SnapshotStore;
use stateboard_types::{Serial, VersionToken};

use crate::error::{BoardError, BoardResult};

/// Resolve a wire token for `state`.
///
/// The empty token and `0` select the latest serial. A numeric token is
/// returned as-is without checking that the serial exists; that is reported
/// later by the fetch as `SnapshotNotFound`.
pub async fn resolve(store: &dyn SnapshotStore, state: &str, token: &str) -> BoardResult<Serial> {
    let token = parse_token(token)?;
    resolve_token(store, state, token).await
}

/// Resolve an already parsed token.
pub async fn resolve_token(
    store: &dyn SnapshotStore,
    state: &str,
    token: VersionToken,
) -> BoardResult<Serial> {
    match token {
        VersionToken::Serial(serial) => Ok(serial),
        VersionToken::Latest => latest_serial(store, state).await,
    }
}

/// The highest serial the store knows for `state`.
pub async fn latest_serial(store: &dyn SnapshotStore, state: &str) -> BoardResult<Serial> {
    let serial = store
        .list_serials(state)
        .await?
        .into_iter()
        .map(|entry| entry.serial)
        .max()
        .ok_or_else(|| BoardError::StateNotFound(state.to_string()))?;
    tracing::debug!(state, %serial, "resolved latest serial");
    Ok(serial)
}

pub(crate) fn parse_token(token: &str) -> BoardResult<VersionToken> {
    VersionToken::parse(token).map_err(|_| BoardError::InvalidVersionToken(token.to_string()))
}
