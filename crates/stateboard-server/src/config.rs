use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stateboard_sdk::{HttpSnapshotStore, InMemorySnapshotStore, Stateboard};

use crate::error::{ServerError, ServerResult};

/// Runtime configuration for the Stateboard server.
///
/// Every field has a default, so a TOML file only needs the keys it sets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Base URL of the remote state-storage service.
    pub store_url: Option<String>,
    /// Directory of `.tfstate` files served from memory when no
    /// `store_url` is set.
    pub state_dir: Option<PathBuf>,
    pub logout_url: Option<String>,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            store_url: None,
            state_dir: None,
            logout_url: None,
            log_level: "info".into(),
            log_format: "plain".into(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Open the configured store and wrap it in a [`Stateboard`].
    ///
    /// `store_url` takes precedence over `state_dir`.
    pub fn open_board(&self) -> ServerResult<Stateboard> {
        if let Some(url) = &self.store_url {
            tracing::debug!(%url, "using remote state store");
            return Ok(Stateboard::with_store(HttpSnapshotStore::new(url)?));
        }
        if let Some(dir) = &self.state_dir {
            let store = InMemorySnapshotStore::load_dir(dir)?;
            tracing::debug!(
                dir = %dir.display(),
                snapshots = store.len(),
                "loaded local state directory"
            );
            return Ok(Stateboard::with_store(store));
        }
        Err(ServerError::Config(
            "no state store configured: set store_url or state_dir".into(),
        ))
    }
}
