//! Comparison orchestration: resolve, fetch, diff.

use stateboard_diff::DiffResult;
use stateboard_store::SnapshotStore;
use stateboard_types::VersionToken;

use crate::error::BoardResult;
use crate::resolver::{latest_serial, parse_token, resolve_token};

/// Compare two versions of `state` given as wire tokens.
///
/// Both tokens are parsed before the store is contacted. When both select
/// the latest version it is resolved once, so both sides see the same serial.
/// Otherwise resolution runs concurrently, as do the two snapshot fetches.
/// The first failure aborts the whole operation and no partial diff is
/// produced.
pub async fn compare_versions(
    store: &dyn SnapshotStore,
    state: &str,
    from_token: &str,
    to_token: &str,
) -> BoardResult<DiffResult> {
    let from_token = parse_token(from_token)?;
    let to_token = parse_token(to_token)?;

    let (from_serial, to_serial) = match (from_token, to_token) {
        (VersionToken::Latest, VersionToken::Latest) => {
            let latest = latest_serial(store, state).await?;
            (latest, latest)
        }
        (from_token, to_token) => tokio::try_join!(
            resolve_token(store, state, from_token),
            resolve_token(store, state, to_token)
        )?,
    };
    tracing::debug!(state, from = %from_serial, to = %to_serial, "comparing versions");

    let (from, to) = tokio::try_join!(
        store.fetch_snapshot(state, from_serial),
        store.fetch_snapshot(state, to_serial)
    )?;

    let diff = stateboard_diff::compare(&from, &to)?;
    tracing::debug!(
        state,
        additions = diff.summary.additions,
        removals = diff.summary.removals,
        modifications = diff.summary.modifications,
        "comparison complete"
    );
    Ok(diff)
}
