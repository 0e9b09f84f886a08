//! HTTP client for a remote state-storage service.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation        | Request                                  |
//! |------------------|------------------------------------------|
//! | list states      | `GET v1/states`                          |
//! | list serials     | `GET v1/states/{name}/serials`           |
//! | fetch snapshot   | `GET v1/states/{name}?serial={n}`        |
//!
//! State names are sent as a single percent-encoded path segment, so names
//! containing `/` survive the round trip.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use stateboard_types::{ActivityEntry, Serial, Snapshot};

use crate::error::{StoreError, StoreResult};
use crate::tfstate::decode_tfstate_value;
use crate::traits::SnapshotStore;

/// A state document as returned by the storage service: version metadata
/// wrapped around the raw `.tfstate` body.
#[derive(Debug, Deserialize)]
pub(crate) struct StateEnvelope {
    pub name: String,
    pub serial: Serial,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub tf_version: String,
    #[serde(default)]
    pub lineage: Option<String>,
    pub state: Value,
}

impl StateEnvelope {
    /// Decode the body; envelope metadata wins over what the body claims.
    pub(crate) fn into_snapshot(self) -> StoreResult<Snapshot> {
        let mut snapshot = decode_tfstate_value(&self.name, self.last_modified, self.state)?;
        snapshot.serial = self.serial;
        if !self.tf_version.is_empty() {
            snapshot.tool_version = self.tf_version;
        }
        if self.lineage.is_some() {
            snapshot.lineage = self.lineage;
        }
        Ok(snapshot)
    }
}

/// Per-request timeout applied by [`HttpSnapshotStore::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`SnapshotStore`] backed by the storage service's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpSnapshotStore {
    client: Client,
    base: Url,
}

impl HttpSnapshotStore {
    /// Create a client for the service at `base_url` with [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: &str) -> StoreResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail with `Unavailable` after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("building HTTP client: {e}")))?;
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> StoreResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid store URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "store URL {base_url:?} cannot be a base"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn states_url(&self) -> Url {
        self.url_for(&[])
    }

    pub(crate) fn serials_url(&self, state: &str) -> Url {
        self.url_for(&[state, "serials"])
    }

    pub(crate) fn snapshot_url(&self, state: &str, serial: Serial) -> Url {
        let mut url = self.url_for(&[state]);
        url.query_pairs_mut().append_pair("serial", &serial.to_string());
        url
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["v1", "states"]).extend(segments);
        }
        url
    }

    /// GET `url` and decode a JSON body; `404` is reported as `None`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> StoreResult<Option<T>> {
        tracing::debug!(%url, "store request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("GET {url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!("GET {url} returned {status}")));
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| StoreError::Unavailable(format!("GET {url}: invalid response body: {e}")))
    }
}

#[async_trait]
impl SnapshotStore for HttpSnapshotStore {
    async fn list_states(&self) -> StoreResult<Vec<String>> {
        Ok(self.get_json(self.states_url()).await?.unwrap_or_default())
    }

    async fn fetch_snapshot(&self, state: &str, serial: Serial) -> StoreResult<Snapshot> {
        let envelope: StateEnvelope = self
            .get_json(self.snapshot_url(state, serial))
            .await?
            .ok_or_else(|| StoreError::SnapshotNotFound {
                state: state.to_string(),
                serial,
            })?;
        envelope.into_snapshot()
    }

    async fn list_serials(&self, state: &str) -> StoreResult<Vec<ActivityEntry>> {
        self.get_json(self.serials_url(state))
            .await?
            .ok_or_else(|| StoreError::StateNotFound(state.to_string()))
    }
}
