use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Stateboard HTTP server.
pub struct StateboardServer {
    config: ServerConfig,
    state: AppState,
}

impl StateboardServer {
    /// Open the configured store and prepare the server.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let mut state = AppState::new(config.open_board()?);
        if let Some(url) = &config.logout_url {
            state = state.with_logout_url(url.clone());
        }
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.config.socket_addr();
        let app = self.router();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Stateboard listening on {}", addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
