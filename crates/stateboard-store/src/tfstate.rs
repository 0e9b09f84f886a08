//! Decoding of Terraform `.tfstate` documents into [`Snapshot`]s.
//!
//! Two on-disk formats are understood:
//!
//! - **v4** (Terraform 0.12+): a flat `resources` array, each entry carrying
//!   `module`, `mode`, `type`, `name` and a list of `instances` with an
//!   optional `index_key` and structured `attributes`.
//! - **v3** (Terraform 0.11 and earlier): a `modules` array whose entries map
//!   resource addresses (`aws_instance.web.1`, `data.aws_ami.x`) to a
//!   `primary` instance with flat string attributes.
//!
//! Both produce the same [`ResourceKey`] shape, so snapshots taken before and
//! after a format upgrade remain comparable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use stateboard_types::{
    AttributeValue, Attributes, Resource, ResourceIndex, ResourceKey, ResourceMode, Serial,
    Snapshot,
};

use crate::error::{StoreError, StoreResult};

/// Decode raw `.tfstate` bytes.
///
/// `last_modified` is not part of the document and must come from the
/// caller (file mtime, store metadata).
pub fn decode_tfstate(
    state: &str,
    last_modified: DateTime<Utc>,
    bytes: &[u8],
) -> StoreResult<Snapshot> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| decode_error(state, e))?;
    decode_tfstate_value(state, last_modified, value)
}

/// Decode an already parsed `.tfstate` document.
pub fn decode_tfstate_value(
    state: &str,
    last_modified: DateTime<Utc>,
    value: Value,
) -> StoreResult<Snapshot> {
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
    match version {
        4 => {
            let doc: StateV4 = serde_json::from_value(value).map_err(|e| decode_error(state, e))?;
            doc.into_snapshot(state, last_modified)
        }
        1..=3 => {
            let doc: StateV3 = serde_json::from_value(value).map_err(|e| decode_error(state, e))?;
            doc.into_snapshot(state, last_modified)
        }
        other => Err(StoreError::Decode {
            state: state.to_string(),
            reason: format!("unsupported state format version {other}"),
        }),
    }
}

fn decode_error(state: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Decode {
        state: state.to_string(),
        reason: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Format v4
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StateV4 {
    #[serde(default)]
    terraform_version: String,
    #[serde(default)]
    serial: u64,
    #[serde(default)]
    lineage: Option<String>,
    #[serde(default)]
    resources: Vec<ResourceV4>,
}

#[derive(Deserialize)]
struct ResourceV4 {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    mode: ResourceMode,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    instances: Vec<InstanceV4>,
}

#[derive(Deserialize)]
struct InstanceV4 {
    #[serde(default)]
    index_key: Option<Value>,
    /// Set on objects awaiting destruction after a create-before-destroy
    /// replacement; they share the address of the current object.
    #[serde(default)]
    deposed: Option<String>,
    #[serde(default)]
    attributes: Option<BTreeMap<String, AttributeValue>>,
    #[serde(default)]
    attributes_flat: Option<BTreeMap<String, String>>,
}

impl StateV4 {
    fn into_snapshot(self, state: &str, last_modified: DateTime<Utc>) -> StoreResult<Snapshot> {
        let mut snapshot = Snapshot::new(state, Serial::new(self.serial), last_modified)
            .with_tool_version(self.terraform_version);
        snapshot.lineage = self.lineage;

        for res in self.resources {
            let base = ResourceKey {
                module: None,
                mode: res.mode,
                resource_type: res.resource_type.clone(),
                name: res.name.clone(),
                index: None,
            }
            .in_module(res.module.clone().unwrap_or_default());

            for instance in res.instances {
                if let Some(deposed) = &instance.deposed {
                    tracing::debug!(state, address = %base, %deposed, "skipping deposed object");
                    continue;
                }
                let mut key = base.clone();
                key.index = match &instance.index_key {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(index_from_json(raw).ok_or_else(|| StoreError::Decode {
                        state: state.to_string(),
                        reason: format!("invalid index_key {raw} on {base}"),
                    })?),
                };

                let attributes: Attributes = match (instance.attributes, instance.attributes_flat) {
                    (Some(attrs), _) => attrs,
                    (None, Some(flat)) => flat
                        .into_iter()
                        .map(|(k, v)| (k, AttributeValue::String(v)))
                        .collect(),
                    (None, None) => Attributes::new(),
                };

                let mut resource = Resource::new(&res.resource_type, &res.name);
                resource.provider = res.provider.clone();
                resource.attributes = attributes;
                snapshot.resources.insert(key, resource);
            }
        }
        Ok(snapshot)
    }
}

fn index_from_json(value: &Value) -> Option<ResourceIndex> {
    match value {
        Value::Number(n) => n.as_u64().map(ResourceIndex::Int),
        Value::String(s) => Some(ResourceIndex::Str(s.clone())),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Format v3
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StateV3 {
    #[serde(default)]
    terraform_version: String,
    #[serde(default)]
    serial: u64,
    #[serde(default)]
    lineage: Option<String>,
    #[serde(default)]
    modules: Vec<ModuleV3>,
}

#[derive(Deserialize)]
struct ModuleV3 {
    #[serde(default)]
    path: Vec<String>,
    #[serde(default)]
    resources: BTreeMap<String, ResourceV3>,
}

#[derive(Deserialize)]
struct ResourceV3 {
    #[serde(rename = "type", default)]
    resource_type: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    primary: Option<InstanceV3>,
}

#[derive(Deserialize)]
struct InstanceV3 {
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

impl StateV3 {
    fn into_snapshot(self, state: &str, last_modified: DateTime<Utc>) -> StoreResult<Snapshot> {
        let mut snapshot = Snapshot::new(state, Serial::new(self.serial), last_modified)
            .with_tool_version(self.terraform_version);
        snapshot.lineage = self.lineage;

        for module in self.modules {
            let module_path = module_address(&module.path);
            for (address, res) in module.resources {
                let mut key = parse_v3_address(&address).ok_or_else(|| StoreError::Decode {
                    state: state.to_string(),
                    reason: format!("malformed resource address {address:?}"),
                })?;
                key = key.in_module(module_path.clone());
                if let Some(resource_type) = &res.resource_type {
                    key.resource_type.clone_from(resource_type);
                }

                let mut resource = Resource::new(&key.resource_type, &key.name);
                resource.provider = res.provider;
                resource.attributes = res
                    .primary
                    .map(|p| {
                        p.attributes
                            .into_iter()
                            .map(|(k, v)| (k, AttributeValue::String(v)))
                            .collect()
                    })
                    .unwrap_or_default();
                snapshot.resources.insert(key, resource);
            }
        }
        Ok(snapshot)
    }
}

/// `["root", "a", "b"]` becomes `module.a.module.b`; the root module is empty.
fn module_address(path: &[String]) -> String {
    path.iter()
        .skip_while(|p| p.as_str() == "root")
        .map(|p| format!("module.{p}"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a v3 resource address: `[data.]type.name[.count_index]`.
fn parse_v3_address(address: &str) -> Option<ResourceKey> {
    let (mode, rest) = match address.strip_prefix("data.") {
        Some(rest) => (ResourceMode::Data, rest),
        None => (ResourceMode::Managed, address),
    };
    let parts: Vec<&str> = rest.split('.').collect();
    let (resource_type, name, index) = match parts.as_slice() {
        [t, n] => (*t, *n, None),
        [t, n, i] => (*t, *n, Some(ResourceIndex::Int(i.parse().ok()?))),
        _ => return None,
    };
    if resource_type.is_empty() || name.is_empty() {
        return None;
    }
    Some(ResourceKey {
        module: None,
        mode,
        resource_type: resource_type.to_string(),
        name: name.to_string(),
        index,
    })
}
