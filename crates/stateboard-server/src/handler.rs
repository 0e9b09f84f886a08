use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use crate::auth::UserInfo;
use crate::error::ServerResult;
use crate::router::AppState;

pub const COPYRIGHT: &str = "Copyright © 2017 Camptocamp";

/// Query parameters accepted under `/api/state/`.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub versionid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "copyright": COPYRIGHT,
    }))
}

pub async fn user_handler(State(state): State<AppState>, headers: HeaderMap) -> Json<UserInfo> {
    Json(UserInfo::from_headers(&headers, state.logout_url.as_deref()))
}

pub async fn states_handler(State(state): State<AppState>) -> ServerResult<Response> {
    let states = state.board.list_states().await?;
    Ok(Json(states).into_response())
}

/// Everything under `/api/state/`.
///
/// State names may contain `/`, so the whole tail is captured and the
/// `activity/` and `compare/` prefixes are matched here.
pub async fn state_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<StateQuery>,
) -> ServerResult<Response> {
    let token = |t: &Option<String>| t.clone().unwrap_or_default();

    if let Some(name) = path.strip_prefix("activity/") {
        tracing::debug!(state = %name, "listing activity");
        let activity = state.board.list_activity(name).await?;
        return Ok(Json(activity).into_response());
    }

    if let Some(name) = path.strip_prefix("compare/") {
        let (from, to) = (token(&query.from), token(&query.to));
        tracing::debug!(state = %name, %from, %to, "comparing versions");
        let diff = state.board.compare_versions(name, &from, &to).await?;
        return Ok(Json(diff).into_response());
    }

    let version = token(&query.versionid);
    tracing::debug!(state = %path, %version, "fetching version");
    let snapshot = state.board.get_version(&path, &version).await?;
    Ok(Json(snapshot).into_response())
}
