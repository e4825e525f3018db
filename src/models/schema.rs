use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub type Attributes = BTreeMap<String, Attribute>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContentKind {
    #[default]
    #[serde(rename = "collectionType")]
    Collection,
    #[serde(rename = "singleType")]
    Single,
}

impl FromStr for ContentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collectionType" | "collection" => Ok(Self::Collection),
            "singleType" | "single" => Ok(Self::Single),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collectionType"),
            Self::Single => write!(f, "singleType"),
        }
    }
}

/// What an attribute holds, as far as population is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalars (`string`, `text`, `uid`, `boolean`, ...). Always returned.
    Plain(String),
    /// An embedded component, stored inline with the entry.
    Component { component: String, repeatable: bool },
    /// A list of components, each item being any one of `components`.
    DynamicZone { components: Vec<String> },
    /// Reference to another content type, stored as document id(s).
    Relation { target: String, many: bool },
    Media { multiple: bool },
}

impl FieldKind {
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute", into = "RawAttribute")]
pub struct Attribute {
    pub kind: FieldKind,
    pub private: bool,
}

impl Attribute {
    pub fn plain(type_name: &str) -> Self {
        Self {
            kind: FieldKind::Plain(type_name.to_string()),
            private: false,
        }
    }

    pub fn component(component: &str) -> Self {
        Self {
            kind: FieldKind::Component {
                component: component.to_string(),
                repeatable: false,
            },
            private: false,
        }
    }

    pub fn dynamic_zone(components: &[&str]) -> Self {
        Self {
            kind: FieldKind::DynamicZone {
                components: components.iter().map(|c| c.to_string()).collect(),
            },
            private: false,
        }
    }

    pub fn relation(target: &str) -> Self {
        Self {
            kind: FieldKind::Relation {
                target: target.to_string(),
                many: false,
            },
            private: false,
        }
    }

    pub fn media() -> Self {
        Self {
            kind: FieldKind::Media { multiple: false },
            private: false,
        }
    }
}

/// Attribute as written in the schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeatable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    private: bool,
}

impl TryFrom<RawAttribute> for Attribute {
    type Error = String;

    fn try_from(raw: RawAttribute) -> Result<Self, Self::Error> {
        let kind = match raw.type_name.as_str() {
            "component" => FieldKind::Component {
                component: raw
                    .component
                    .ok_or("component attribute requires `component`")?,
                repeatable: raw.repeatable.unwrap_or(false),
            },
            "dynamiczone" => {
                if raw.components.is_empty() {
                    return Err("dynamiczone attribute requires `components`".to_string());
                }
                FieldKind::DynamicZone {
                    components: raw.components,
                }
            }
            "relation" => FieldKind::Relation {
                target: raw.target.ok_or("relation attribute requires `target`")?,
                many: matches!(
                    raw.relation.as_deref(),
                    Some("oneToMany" | "manyToMany" | "manyWay")
                ),
            },
            "media" => FieldKind::Media {
                multiple: raw.multiple.unwrap_or(false),
            },
            other => FieldKind::Plain(other.to_string()),
        };
        Ok(Self {
            kind,
            private: raw.private,
        })
    }
}

impl From<Attribute> for RawAttribute {
    fn from(attr: Attribute) -> Self {
        let mut raw = RawAttribute {
            type_name: String::new(),
            component: None,
            repeatable: None,
            components: Vec::new(),
            target: None,
            relation: None,
            multiple: None,
            private: attr.private,
        };
        match attr.kind {
            FieldKind::Plain(type_name) => raw.type_name = type_name,
            FieldKind::Component {
                component,
                repeatable,
            } => {
                raw.type_name = "component".to_string();
                raw.component = Some(component);
                raw.repeatable = repeatable.then_some(true);
            }
            FieldKind::DynamicZone { components } => {
                raw.type_name = "dynamiczone".to_string();
                raw.components = components;
            }
            FieldKind::Relation { target, many } => {
                raw.type_name = "relation".to_string();
                raw.target = Some(target);
                raw.relation = Some(if many { "oneToMany" } else { "oneToOne" }.to_string());
            }
            FieldKind::Media { multiple } => {
                raw.type_name = "media".to_string();
                raw.multiple = multiple.then_some(true);
            }
        }
        raw
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeSchema {
    #[serde(default)]
    pub kind: ContentKind,
    pub display_name: Option<String>,
    pub singular_name: String,
    pub plural_name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSchema {
    #[serde(default)]
    pub attributes: Attributes,
}

/// Content types and components known to the site, keyed by uid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    pub content_types: BTreeMap<String, ContentTypeSchema>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentSchema>,
}

impl SchemaRegistry {
    pub fn content_type(&self, uid: &str) -> Option<&ContentTypeSchema> {
        self.content_types.get(uid)
    }

    /// Attributes of a content type or a component.
    pub fn attributes_of(&self, uid: &str) -> Option<&Attributes> {
        self.content_types
            .get(uid)
            .map(|ct| &ct.attributes)
            .or_else(|| self.components.get(uid).map(|c| &c.attributes))
    }
}
