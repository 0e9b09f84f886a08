use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Whether a resource is managed by the configuration or read from a data
/// source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

/// Instance index of a resource declared with `count` or `for_each`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceIndex {
    Int(u64),
    Str(String),
}

impl fmt::Display for ResourceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "[{i}]"),
            Self::Str(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                write!(f, "[{quoted}]")
            }
        }
    }
}

/// Address of one resource instance inside a snapshot.
///
/// Rendered the way Terraform addresses resources:
/// `[module.<name>.]*[data.]<type>.<name>[<index>]`. Keys order by module,
/// mode, type, name, then index, which is the order diff output follows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Module path such as `module.vpc` or `module.a.module.b`; `None` for
    /// the root module.
    pub module: Option<String>,
    pub mode: ResourceMode,
    pub resource_type: String,
    pub name: String,
    pub index: Option<ResourceIndex>,
}

impl ResourceKey {
    /// Key of a managed resource in the root module.
    pub fn managed(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: None,
            mode: ResourceMode::Managed,
            resource_type: resource_type.into(),
            name: name.into(),
            index: None,
        }
    }

    /// Key of a data source in the root module.
    pub fn data(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Data,
            ..Self::managed(resource_type, name)
        }
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        self.module = if module.is_empty() || module == "root" {
            None
        } else {
            Some(module)
        };
        self
    }

    pub fn with_index(mut self, index: ResourceIndex) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{module}.")?;
        }
        if self.mode == ResourceMode::Data {
            write!(f, "data.")?;
        }
        write!(f, "{}.{}", self.resource_type, self.name)?;
        if let Some(index) = &self.index {
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourceKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypeError::InvalidResourceKey {
            key: s.to_string(),
            reason: reason.to_string(),
        };

        let segments = split_address(s).ok_or_else(|| invalid("unbalanced brackets or quotes"))?;
        let mut rest = segments.as_slice();

        let mut modules = Vec::new();
        while let [first, name, tail @ ..] = rest {
            if *first != "module" || tail.len() < 2 {
                break;
            }
            modules.push(format!("module.{name}"));
            rest = tail;
        }

        let mode = match rest {
            ["data", tail @ ..] if tail.len() == 2 => {
                rest = tail;
                ResourceMode::Data
            }
            _ => ResourceMode::Managed,
        };

        let [resource_type, name] = rest else {
            return Err(invalid("expected <type>.<name>"));
        };
        if resource_type.is_empty() || resource_type.contains('[') {
            return Err(invalid("empty or indexed resource type"));
        }

        let (name, index) = match name.find('[') {
            Some(pos) => {
                let raw = name[pos..]
                    .strip_prefix('[')
                    .and_then(|r| r.strip_suffix(']'))
                    .ok_or_else(|| invalid("malformed index"))?;
                (&name[..pos], Some(parse_index(raw).ok_or_else(|| invalid("malformed index"))?))
            }
            None => (*name, None),
        };
        if name.is_empty() {
            return Err(invalid("empty resource name"));
        }

        Ok(Self {
            module: (!modules.is_empty()).then(|| modules.join(".")),
            mode,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            index,
        })
    }
}

/// Split an address on dots that sit outside brackets and quotes.
fn split_address(s: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            '.' if depth == 0 => {
                segments.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return None;
    }
    segments.push(&s[start..]);
    Some(segments)
}

fn parse_index(raw: &str) -> Option<ResourceIndex> {
    if raw.starts_with('"') {
        serde_json::from_str::<String>(raw).ok().map(ResourceIndex::Str)
    } else {
        raw.parse().ok().map(ResourceIndex::Int)
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
