//! Snapshot comparison.
//!
//! Resources present in only one snapshot are reported whole. Resources
//! present in both are compared attribute by attribute; a resource whose
//! attributes are all structurally equal is omitted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use stateboard_types::{AttributeValue, Attributes, ResourceKey, Snapshot, VersionSummary};

use crate::error::{DiffError, Result};
use crate::leaf::{collect_leaf_changes, LeafChange};

/// Kind of a resource or attribute change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// The result of comparing two snapshots of one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Name of the compared state.
    pub state: String,
    pub from: VersionSummary,
    pub to: VersionSummary,
    /// Changed resources, ordered by resource key.
    pub changes: Vec<ResourceChange>,
    pub summary: DiffSummary,
}

impl DiffResult {
    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed resources.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Look up the change for one resource.
    pub fn change_for(&self, key: &ResourceKey) -> Option<&ResourceChange> {
        self.changes
            .binary_search_by(|c| c.key().cmp(key))
            .ok()
            .map(|i| &self.changes[i])
    }
}

/// Per-kind resource counts of a [`DiffResult`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
}

impl DiffSummary {
    fn tally(changes: &[ResourceChange]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, change| {
            match change.kind() {
                ChangeKind::Added => acc.additions += 1,
                ChangeKind::Removed => acc.removals += 1,
                ChangeKind::Modified => acc.modifications += 1,
            }
            acc
        })
    }
}

/// A single changed resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceChange {
    /// The resource exists only in the newer snapshot.
    Added { key: ResourceKey, new: Attributes },
    /// The resource exists only in the older snapshot.
    Removed { key: ResourceKey, old: Attributes },
    /// The resource exists in both with differing attributes.
    Modified {
        key: ResourceKey,
        attributes: Vec<AttributeChange>,
    },
}

impl ResourceChange {
    pub fn key(&self) -> &ResourceKey {
        match self {
            Self::Added { key, .. } | Self::Removed { key, .. } | Self::Modified { key, .. } => key,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Added { .. } => ChangeKind::Added,
            Self::Removed { .. } => ChangeKind::Removed,
            Self::Modified { .. } => ChangeKind::Modified,
        }
    }
}

/// A single changed attribute of a modified resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeChange {
    Added {
        name: String,
        new: AttributeValue,
    },
    Removed {
        name: String,
        old: AttributeValue,
    },
    Modified {
        name: String,
        old: AttributeValue,
        new: AttributeValue,
    },
}

impl AttributeChange {
    pub fn name(&self) -> &str {
        match self {
            Self::Added { name, .. } | Self::Removed { name, .. } | Self::Modified { name, .. } => {
                name
            }
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Added { .. } => ChangeKind::Added,
            Self::Removed { .. } => ChangeKind::Removed,
            Self::Modified { .. } => ChangeKind::Modified,
        }
    }

    pub fn old(&self) -> Option<&AttributeValue> {
        match self {
            Self::Removed { old, .. } | Self::Modified { old, .. } => Some(old),
            Self::Added { .. } => None,
        }
    }

    pub fn new_value(&self) -> Option<&AttributeValue> {
        match self {
            Self::Added { new, .. } | Self::Modified { new, .. } => Some(new),
            Self::Removed { .. } => None,
        }
    }

    /// Expand this change into the nested paths that actually differ.
    ///
    /// A modified `tags` mapping where only `Name` changed yields a single
    /// `tags.Name` leaf; sequence elements are addressed as `ports[1]`.
    pub fn leaf_changes(&self) -> Vec<LeafChange> {
        let mut out = Vec::new();
        collect_leaf_changes(self.name(), self.old(), self.new_value(), &mut out);
        out
    }
}

/// Compare two snapshots of the same state.
///
/// Fails with [`DiffError::IncomparableSnapshots`] if the snapshots belong to
/// different states. The output is ordered by resource key, and attribute
/// changes by attribute name, independent of how either snapshot was built.
pub fn compare(from: &Snapshot, to: &Snapshot) -> Result<DiffResult> {
    if from.state != to.state {
        return Err(DiffError::IncomparableSnapshots {
            from: from.state.clone(),
            to: to.state.clone(),
        });
    }

    let keys: BTreeSet<&ResourceKey> = from.resources.keys().chain(to.resources.keys()).collect();
    let mut changes = Vec::new();

    for key in keys {
        match (from.resources.get(key), to.resources.get(key)) {
            (None, Some(new)) => changes.push(ResourceChange::Added {
                key: key.clone(),
                new: new.attributes.clone(),
            }),
            (Some(old), None) => changes.push(ResourceChange::Removed {
                key: key.clone(),
                old: old.attributes.clone(),
            }),
            (Some(old), Some(new)) => {
                let attributes = diff_attributes(&old.attributes, &new.attributes);
                if !attributes.is_empty() {
                    changes.push(ResourceChange::Modified {
                        key: key.clone(),
                        attributes,
                    });
                }
            }
            (None, None) => {}
        }
    }

    Ok(DiffResult {
        state: to.state.clone(),
        from: from.summary(),
        to: to.summary(),
        summary: DiffSummary::tally(&changes),
        changes,
    })
}

/// Compute the attribute-level diff of two attribute sets.
///
/// Names present only in `new` are `Added`, names present only in `old` are
/// `Removed`, and names present in both with structurally different values
/// are `Modified`. Equal attributes are omitted.
pub fn diff_attributes(old: &Attributes, new: &Attributes) -> Vec<AttributeChange> {
    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    names
        .into_iter()
        .filter_map(|name| match (old.get(name), new.get(name)) {
            (Some(o), Some(n)) if o == n => None,
            (Some(o), Some(n)) => Some(AttributeChange::Modified {
                name: name.clone(),
                old: o.clone(),
                new: n.clone(),
            }),
            (None, Some(n)) => Some(AttributeChange::Added {
                name: name.clone(),
                new: n.clone(),
            }),
            (Some(o), None) => Some(AttributeChange::Removed {
                name: name.clone(),
                old: o.clone(),
            }),
            (None, None) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use stateboard_types::{Resource, Serial};

    fn snapshot(state: &str, serial: u64, resources: &[(ResourceKey, Value)]) -> Snapshot {
        let at = Utc.timestamp_opt(serial as i64 * 3600, 0).single().unwrap();
        resources.iter().fold(
            Snapshot::new(state, Serial::new(serial), at),
            |snap, (key, attrs)| {
                let mut resource = Resource::new(&key.resource_type, &key.name);
                if let AttributeValue::Mapping(map) = AttributeValue::from(attrs.clone()) {
                    resource.attributes = map;
                }
                snap.with_resource(key.clone(), resource)
            },
        )
    }

    fn web() -> ResourceKey {
        ResourceKey::managed("aws_instance", "web")
    }

    fn db() -> ResourceKey {
        ResourceKey::managed("aws_instance", "db")
    }

    #[test]
    fn identical_snapshots_no_diff() {
        let snap = snapshot("net", 1, &[(web(), json!({"ami": "x", "size": "t2.micro"}))]);
        let diff = compare(&snap, &snap).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.summary, DiffSummary::default());
    }

    #[test]
    fn net_scenario() {
        let v1 = snapshot("net", 1, &[(web(), json!({"ami": "x", "size": "t2.micro"}))]);
        let v2 = snapshot(
            "net",
            2,
            &[
                (web(), json!({"ami": "y", "size": "t2.micro"})),
                (db(), json!({"ami": "z"})),
            ],
        );

        let diff = compare(&v1, &v2).unwrap();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.from.serial, Serial::new(1));
        assert_eq!(diff.to.serial, Serial::new(2));

        // db sorts before web.
        match &diff.changes[0] {
            ResourceChange::Added { key, new } => {
                assert_eq!(*key, db());
                assert_eq!(new.len(), 1);
                assert_eq!(new["ami"], AttributeValue::from("z"));
            }
            other => panic!("expected Added, got {:?}", other),
        }
        match &diff.changes[1] {
            ResourceChange::Modified { key, attributes } => {
                assert_eq!(*key, web());
                assert_eq!(
                    attributes,
                    &vec![AttributeChange::Modified {
                        name: "ami".into(),
                        old: "x".into(),
                        new: "y".into(),
                    }]
                );
            }
            other => panic!("expected Modified, got {:?}", other),
        }
        assert_eq!(
            diff.summary,
            DiffSummary {
                additions: 1,
                removals: 0,
                modifications: 1
            }
        );
    }

    #[test]
    fn removed_resource_records_old_attributes() {
        let v1 = snapshot("s", 1, &[(db(), json!({"ami": "z", "tags": {"env": "prod"}}))]);
        let v2 = snapshot("s", 2, &[]);
        let diff = compare(&v1, &v2).unwrap();
        match &diff.changes[..] {
            [ResourceChange::Removed { key, old }] => {
                assert_eq!(*key, db());
                assert_eq!(old.len(), 2);
            }
            other => panic!("expected one Removed, got {:?}", other),
        }
    }

    #[test]
    fn attribute_added_and_removed() {
        let v1 = snapshot("s", 1, &[(web(), json!({"a": 1, "b": 2}))]);
        let v2 = snapshot("s", 2, &[(web(), json!({"b": 2, "c": 3}))]);
        let diff = compare(&v1, &v2).unwrap();
        let ResourceChange::Modified { attributes, .. } = &diff.changes[0] else {
            panic!("expected Modified");
        };
        let kinds: Vec<(&str, ChangeKind)> =
            attributes.iter().map(|a| (a.name(), a.kind())).collect();
        assert_eq!(kinds, vec![("a", ChangeKind::Removed), ("c", ChangeKind::Added)]);
    }

    #[test]
    fn type_change_is_modification() {
        let v1 = snapshot("s", 1, &[(web(), json!({"port": 1}))]);
        let v2 = snapshot("s", 2, &[(web(), json!({"port": "1"}))]);
        assert_eq!(compare(&v1, &v2).unwrap().summary.modifications, 1);
    }

    #[test]
    fn sequence_reordering_is_modification() {
        let v1 = snapshot("s", 1, &[(web(), json!({"sg": ["a", "b"]}))]);
        let v2 = snapshot("s", 2, &[(web(), json!({"sg": ["b", "a"]}))]);
        assert_eq!(compare(&v1, &v2).unwrap().len(), 1);
    }

    #[test]
    fn mapping_key_order_is_not_modification() {
        let a: Value = serde_json::from_str(r#"{"tags": {"x": 1, "y": 2}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"tags": {"y": 2, "x": 1}}"#).unwrap();
        let v1 = snapshot("s", 1, &[(web(), a)]);
        let v2 = snapshot("s", 2, &[(web(), b)]);
        assert!(compare(&v1, &v2).unwrap().is_empty());
    }

    #[test]
    fn different_states_incomparable() {
        let foo = snapshot("foo", 1, &[]);
        let bar = snapshot("bar", 1, &[]);
        assert_eq!(
            compare(&foo, &bar).unwrap_err(),
            DiffError::IncomparableSnapshots {
                from: "foo".into(),
                to: "bar".into()
            }
        );
    }

    #[test]
    fn serialized_field_names_are_stable() {
        let v1 = snapshot("net", 1, &[(web(), json!({"ami": "x"}))]);
        let v2 = snapshot("net", 2, &[(web(), json!({"ami": "y"})), (db(), json!({"ami": "z"}))]);
        let json = serde_json::to_value(compare(&v1, &v2).unwrap()).unwrap();

        assert_eq!(json["state"], "net");
        assert_eq!(json["from"]["serial"], 1);
        assert_eq!(json["changes"][0]["key"], "aws_instance.db");
        assert_eq!(json["changes"][0]["kind"], "added");
        assert_eq!(json["changes"][0]["new"]["ami"], "z");
        assert_eq!(json["changes"][1]["kind"], "modified");
        assert_eq!(json["changes"][1]["attributes"][0]["name"], "ami");
        assert_eq!(json["changes"][1]["attributes"][0]["old"], "x");
        assert_eq!(json["changes"][1]["attributes"][0]["new"], "y");
        assert_eq!(json["summary"]["additions"], 1);
    }

    #[test]
    fn output_independent_of_insertion_order() {
        let keys: Vec<ResourceKey> = (0..20)
            .map(|i| ResourceKey::managed("null_resource", format!("r{i:02}")))
            .collect();
        let forward: Vec<_> = keys.iter().map(|k| (k.clone(), json!({"v": 1}))).collect();
        let backward: Vec<_> = keys.iter().rev().map(|k| (k.clone(), json!({"v": 1}))).collect();

        let empty = snapshot("s", 1, &[]);
        let a = serde_json::to_string(&compare(&empty, &snapshot("s", 2, &forward)).unwrap()).unwrap();
        let b = serde_json::to_string(&compare(&empty, &snapshot("s", 2, &backward)).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn change_for_finds_resource() {
        let v1 = snapshot("s", 1, &[]);
        let v2 = snapshot("s", 2, &[(web(), json!({})), (db(), json!({}))]);
        let diff = compare(&v1, &v2).unwrap();
        assert_eq!(diff.change_for(&web()).map(ResourceChange::kind), Some(ChangeKind::Added));
        assert!(diff.change_for(&ResourceKey::managed("x", "y")).is_none());
    }

    #[test]
    fn roundtrips_through_json() {
        let v1 = snapshot("s", 1, &[(web(), json!({"a": [1, {"b": null}]}))]);
        let v2 = snapshot("s", 2, &[(web(), json!({"a": [1, {"b": true}]}))]);
        let diff = compare(&v1, &v2).unwrap();
        let back: DiffResult = serde_json::from_str(&serde_json::to_string(&diff).unwrap()).unwrap();
        assert_eq!(back, diff);
    }
}
