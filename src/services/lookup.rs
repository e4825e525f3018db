use crate::config::SlugConfig;
use crate::models::{Attributes, EntryStatus, FieldKind, WILDCARD};
use crate::services::populate::{deep_populate, SchemaLookup};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Arguments for a single document fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FindParams {
    pub slug: String,
    pub populate: Value,
    pub fields: Option<Vec<String>>,
    pub locale: Option<String>,
    pub status: EntryStatus,
}

pub trait DocumentStore {
    fn find_first(&self, uid: &str, params: &FindParams)
        -> anyhow::Result<Option<Map<String, Value>>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupQuery {
    pub locale: Option<String>,
    #[serde(rename = "publicationState")]
    pub publication_state: Option<String>,
    pub populate: Option<String>,
    pub fields: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Missing uid or slug")]
    MissingParameter,

    #[error("{0}")]
    InvalidQuery(String),

    #[error("Not Found")]
    NotFound,

    #[error("An error occurred while fetching the entity by slug")]
    Collaborator(#[from] anyhow::Error),
}

/// Finds entries by slug on behalf of the `/slug/:slug` endpoints.
pub struct SlugLookup<'a, D: ?Sized, S: ?Sized> {
    config: &'a SlugConfig,
    documents: &'a D,
    schemas: &'a S,
}

impl<'a, D, S> SlugLookup<'a, D, S>
where
    D: DocumentStore + ?Sized,
    S: SchemaLookup + ?Sized,
{
    pub fn new(config: &'a SlugConfig, documents: &'a D, schemas: &'a S) -> Self {
        Self {
            config,
            documents,
            schemas,
        }
    }

    pub fn find_by_slug(
        &self,
        uid: Option<&str>,
        slug: Option<&str>,
        query: &LookupQuery,
    ) -> Result<Map<String, Value>, LookupError> {
        let (Some(uid), Some(slug)) = (
            uid.filter(|u| !u.is_empty()),
            slug.filter(|s| !s.is_empty()),
        ) else {
            return Err(LookupError::MissingParameter);
        };

        let attributes = self.schemas.attributes(uid);
        let fields = parse_fields(query.fields.as_deref(), attributes)?;
        let populate = match parse_populate(query.populate.as_deref(), attributes)? {
            Some(requested) => requested,
            None => deep_populate(self.schemas, self.config, uid).to_value(),
        };

        let publication_state = query.publication_state.as_deref();
        let mut params = FindParams {
            slug: slug.to_string(),
            populate,
            fields,
            locale: query.locale.clone().filter(|l| !l.is_empty()),
            status: EntryStatus::from_publication_state(publication_state),
        };

        let mut entity = self.documents.find_first(uid, &params)?;
        if entity.is_none() && publication_state == Some("preview") {
            tracing::debug!("No draft for {} '{}', trying published", uid, slug);
            params.status = EntryStatus::Published;
            entity = self.documents.find_first(uid, &params)?;
        }

        let mut entity = entity.ok_or(LookupError::NotFound)?;
        if let Some(attributes) = attributes {
            strip_private(self.schemas, &mut entity, attributes);
        }
        trim_localizations(&mut entity);
        Ok(entity)
    }
}

/// Caller populate, used verbatim: `*`, a JSON object/array, or a comma separated field list.
/// `None` when the caller did not ask for anything.
fn parse_populate(
    raw: Option<&str>,
    attributes: Option<&Attributes>,
) -> Result<Option<Value>, LookupError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    if raw == WILDCARD {
        return Ok(Some(Value::from(WILDCARD)));
    }

    let value = if raw.starts_with('{') || raw.starts_with('[') {
        serde_json::from_str::<Value>(raw)
            .map_err(|e| LookupError::InvalidQuery(format!("Invalid populate: {}", e)))?
    } else {
        Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(Value::from)
                .collect(),
        )
    };

    if let Some(attributes) = attributes {
        let names: Vec<&str> = match &value {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        for name in names {
            let populatable = name == "localizations"
                || attributes.get(name).is_some_and(|a| !a.kind.is_plain());
            if !populatable {
                return Err(LookupError::InvalidQuery(format!(
                    "Invalid populate key: {}",
                    name
                )));
            }
        }
    }

    Ok(Some(value))
}

fn parse_fields(
    raw: Option<&str>,
    attributes: Option<&Attributes>,
) -> Result<Option<Vec<String>>, LookupError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    let fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();

    if let Some(attributes) = attributes {
        for field in &fields {
            match attributes.get(field).map(|a| &a.kind) {
                Some(FieldKind::Plain(_)) => {}
                _ => {
                    return Err(LookupError::InvalidQuery(format!(
                        "Invalid field: {}",
                        field
                    )))
                }
            }
        }
    }

    Ok(Some(fields))
}

/// Removes private attributes, descending into components, dynamic zones and populated relations.
fn strip_private<S: SchemaLookup + ?Sized>(
    schemas: &S,
    entity: &mut Map<String, Value>,
    attributes: &Attributes,
) {
    for (name, attribute) in attributes {
        if attribute.private {
            entity.remove(name);
            continue;
        }
        let Some(value) = entity.get_mut(name) else {
            continue;
        };
        match &attribute.kind {
            FieldKind::Component { component, .. } => {
                if let Some(nested) = schemas.attributes(component) {
                    strip_private_value(schemas, value, nested);
                }
            }
            FieldKind::Relation { target, .. } => {
                if let Some(nested) = schemas.attributes(target) {
                    strip_private_value(schemas, value, nested);
                }
            }
            FieldKind::DynamicZone { .. } => {
                let Value::Array(items) = value else {
                    continue;
                };
                for item in items.iter_mut().filter_map(Value::as_object_mut) {
                    let variant = item
                        .get("__component")
                        .and_then(Value::as_str)
                        .and_then(|uid| schemas.attributes(uid));
                    if let Some(nested) = variant {
                        strip_private(schemas, item, nested);
                    }
                }
            }
            FieldKind::Media { .. } | FieldKind::Plain(_) => {}
        }
    }
}

/// A single object or a list of objects sharing one schema.
fn strip_private_value<S: SchemaLookup + ?Sized>(
    schemas: &S,
    value: &mut Value,
    attributes: &Attributes,
) {
    match value {
        Value::Object(map) => strip_private(schemas, map, attributes),
        Value::Array(items) => {
            for map in items.iter_mut().filter_map(Value::as_object_mut) {
                strip_private(schemas, map, attributes);
            }
        }
        _ => {}
    }
}

/// Reduces each localization to its `documentId`, `slug` and `locale`, dropping incomplete ones.
pub fn trim_localizations(entity: &mut Map<String, Value>) {
    const KEYS: [&str; 3] = ["documentId", "slug", "locale"];

    let Some(Value::Array(localizations)) = entity.get_mut("localizations") else {
        return;
    };

    let trimmed: Vec<Value> = localizations
        .iter()
        .filter_map(Value::as_object)
        .filter(|loc| KEYS.iter().all(|key| loc.contains_key(*key)))
        .map(|loc| {
            Value::Object(
                KEYS.iter()
                    .map(|key| (key.to_string(), loc[*key].clone()))
                    .collect(),
            )
        })
        .collect();
    *localizations = trimmed;
}
