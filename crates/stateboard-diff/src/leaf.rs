//! Leaf-level expansion of attribute changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stateboard_types::AttributeValue;

/// One differing path inside a changed attribute.
///
/// `old` is `None` when the path only exists on the new side and vice versa.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafChange {
    pub path: String,
    pub old: Option<AttributeValue>,
    pub new: Option<AttributeValue>,
}

/// Walk `old` and `new` in parallel, pushing every differing leaf.
///
/// Mappings are matched by key and sequences by position. Where the two
/// sides have different shapes, or one side is missing, the whole subtree is
/// reported at the current path.
pub(crate) fn collect_leaf_changes(
    path: &str,
    old: Option<&AttributeValue>,
    new: Option<&AttributeValue>,
    out: &mut Vec<LeafChange>,
) {
    match (old, new) {
        (Some(AttributeValue::Mapping(o)), Some(AttributeValue::Mapping(n))) => {
            let keys: BTreeSet<&String> = o.keys().chain(n.keys()).collect();
            for key in keys {
                collect_leaf_changes(&format!("{path}.{key}"), o.get(key), n.get(key), out);
            }
        }
        (Some(AttributeValue::Sequence(o)), Some(AttributeValue::Sequence(n))) => {
            for i in 0..o.len().max(n.len()) {
                collect_leaf_changes(&format!("{path}[{i}]"), o.get(i), n.get(i), out);
            }
        }
        (o, n) if o != n => out.push(LeafChange {
            path: path.to_string(),
            old: o.cloned(),
            new: n.cloned(),
        }),
        _ => {}
    }
}
