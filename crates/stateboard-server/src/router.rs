use std::sync::Arc;

use axum::{routing::get, Router};
use stateboard_sdk::Stateboard;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub board: Arc<Stateboard>,
    pub logout_url: Option<String>,
}

impl AppState {
    pub fn new(board: Stateboard) -> Self {
        Self {
            board: Arc::new(board),
            logout_url: None,
        }
    }

    pub fn with_logout_url(mut self, url: impl Into<String>) -> Self {
        self.logout_url = Some(url.into());
        self
    }
}

/// Build the axum router with all Stateboard endpoints.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handler::health_handler))
        .route("/api/version", get(handler::version_handler))
        .route("/api/user", get(handler::user_handler))
        .route("/api/states", get(handler::states_handler))
        .route("/api/state/*path", get(handler::state_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
