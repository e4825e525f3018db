use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

pub const WILDCARD: &str = "*";

/// Which nested data a lookup should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateTree {
    /// Fetch every relational field one level deep. Serialized as `"*"`.
    Wildcard,
    Fields(BTreeMap<String, FieldPopulate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPopulate {
    /// Media and relations: fetched as they are, never descended into.
    Shallow,
    /// Components: `{"populate": <tree>}`.
    Nested(PopulateTree),
    /// Dynamic zones: `{"on": {<component uid>: {"populate": <tree>}}}`.
    Variants(BTreeMap<String, PopulateTree>),
}

impl PopulateTree {
    /// An empty field map means the same as the wildcard.
    pub fn from_fields(fields: BTreeMap<String, FieldPopulate>) -> Self {
        if fields.is_empty() {
            Self::Wildcard
        } else {
            Self::Fields(fields)
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::from(WILDCARD))
    }
}

impl Serialize for PopulateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Wildcard => serializer.serialize_str(WILDCARD),
            Self::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, field) in fields {
                    map.serialize_entry(name, field)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Serialize)]
struct Nested<'a> {
    populate: &'a PopulateTree,
}

impl Serialize for FieldPopulate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Shallow => serializer.serialize_bool(true),
            Self::Nested(tree) => Nested { populate: tree }.serialize(serializer),
            Self::Variants(variants) => {
                let on: BTreeMap<&str, Nested<'_>> = variants
                    .iter()
                    .map(|(uid, tree)| (uid.as_str(), Nested { populate: tree }))
                    .collect();
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("on", &on)?;
                map.end()
            }
        }
    }
}
