use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::ResourceKey;
use crate::serial::Serial;
use crate::value::AttributeValue;

/// Attribute name to value mapping of one resource instance.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// One resource instance recorded in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// An immutable point-in-time capture of a state.
///
/// Snapshots are produced by the store and only ever read by Stateboard.
/// `resources` is keyed by [`ResourceKey`], so keys are unique and iterate in
/// address order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name (path) of the state this snapshot belongs to.
    pub state: String,
    pub serial: Serial,
    pub last_modified: DateTime<Utc>,
    /// Version of the tool that wrote the snapshot. Informational only.
    #[serde(default)]
    pub tool_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<ResourceKey, Resource>,
}

impl Snapshot {
    pub fn new(state: impl Into<String>, serial: Serial, last_modified: DateTime<Utc>) -> Self {
        Self {
            state: state.into(),
            serial,
            last_modified,
            tool_version: String::new(),
            lineage: None,
            resources: BTreeMap::new(),
        }
    }

    pub fn with_tool_version(mut self, tool_version: impl Into<String>) -> Self {
        self.tool_version = tool_version.into();
        self
    }

    pub fn with_lineage(mut self, lineage: impl Into<String>) -> Self {
        self.lineage = Some(lineage.into());
        self
    }

    pub fn with_resource(mut self, key: ResourceKey, resource: Resource) -> Self {
        self.resources.insert(key, resource);
        self
    }

    pub fn resource(&self, key: &ResourceKey) -> Option<&Resource> {
        self.resources.get(key)
    }

    /// Metadata header of this snapshot.
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            serial: self.serial,
            last_modified: self.last_modified,
            tool_version: self.tool_version.clone(),
        }
    }

    pub fn activity_entry(&self) -> ActivityEntry {
        ActivityEntry {
            serial: self.serial,
            last_modified: self.last_modified,
        }
    }
}

/// Version metadata without the resource body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub serial: Serial,
    pub last_modified: DateTime<Utc>,
    pub tool_version: String,
}

/// One entry of a state's version history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub serial: Serial,
    pub last_modified: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(serial: Serial, last_modified: DateTime<Utc>) -> Self {
        Self {
            serial,
            last_modified,
        }
    }
}
