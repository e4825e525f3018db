use crate::config::SlugConfig;
use crate::models::{Attributes, Entry, EntryStatus, FieldKind, SchemaRegistry, WriteEntry, WILDCARD};
use crate::services::lifecycle::SlugLifecycles;
use crate::services::lookup::{DocumentStore, FindParams};
use crate::services::slug::{SlugResolver, SlugStore};
use crate::Database;
use anyhow::{anyhow, Result};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::{Map, Value};

pub const DEFAULT_LOCALE: &str = "en";

/// Keys owned by the store; never taken from client data.
const RESERVED_KEYS: [&str; 7] = [
    "id",
    "documentId",
    "locale",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "localizations",
];

const ENTRY_COLUMNS: &str =
    "id, document_id, content_type, locale, status, slug, data, created_at, updated_at";

/// Entries of the site's content types, backed by SQLite.
pub struct Documents<'a> {
    db: &'a Database,
    schema: &'a SchemaRegistry,
}

impl<'a> Documents<'a> {
    pub fn new(db: &'a Database, schema: &'a SchemaRegistry) -> Self {
        Self { db, schema }
    }

    pub fn get_entry(
        &self,
        uid: &str,
        document_id: &str,
        locale: &str,
        status: EntryStatus,
    ) -> Result<Option<Entry>> {
        let conn = self.db.get()?;
        let entry = conn
            .query_row(
                &format!(
                    "SELECT {} FROM entries WHERE content_type = ?1 AND document_id = ?2 AND locale = ?3 AND status = ?4",
                    ENTRY_COLUMNS
                ),
                params![uid, document_id, locale, status.to_string()],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Other locales of the same document, same status.
    fn localizations(&self, entry: &Entry) -> Result<Vec<Entry>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM entries WHERE document_id = ?1 AND status = ?2 AND locale != ?3 ORDER BY locale",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(
                params![entry.document_id, entry.status.to_string(), entry.locale],
                row_to_entry,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Applies `populate` and `fields` to an entry of `uid`.
    fn project(
        &self,
        attributes: &Attributes,
        mut data: Map<String, Value>,
        populate: &Value,
        fields: Option<&[String]>,
        ctx: &Projection<'_>,
    ) -> Result<Map<String, Value>> {
        let requested = Requested::from_value(populate);

        for (name, attribute) in attributes {
            if let FieldKind::Plain(_) = attribute.kind {
                if fields.is_some_and(|fields| !fields.iter().any(|f| f == name)) {
                    data.remove(name);
                }
                continue;
            }

            let Some(nested) = requested.get(name) else {
                data.remove(name);
                continue;
            };
            let Some(value) = data.remove(name) else {
                continue;
            };

            let projected = match &attribute.kind {
                FieldKind::Component { component, .. } => {
                    self.project_component(component, value, &nested_populate(&nested), ctx)?
                }
                FieldKind::DynamicZone { .. } => self.project_zone(value, &nested, ctx)?,
                FieldKind::Relation { target, .. } => {
                    self.resolve_relation(target, value, &nested_populate(&nested), ctx)?
                }
                FieldKind::Media { .. } | FieldKind::Plain(_) => value,
            };
            data.insert(name.clone(), projected);
        }

        Ok(data)
    }

    fn project_component(
        &self,
        component: &str,
        value: Value,
        populate: &Value,
        ctx: &Projection<'_>,
    ) -> Result<Value> {
        let Some(attributes) = self.schema.attributes_of(component) else {
            return Ok(value);
        };
        match value {
            Value::Object(item) => Ok(Value::Object(
                self.project(attributes, item, populate, None, ctx)?,
            )),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.project_component(component, item, populate, ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }

    fn project_zone(&self, value: Value, nested: &Value, ctx: &Projection<'_>) -> Result<Value> {
        let Value::Array(items) = value else {
            return Ok(value);
        };

        let variants = nested.get("on").and_then(Value::as_object);
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let Some(variant) = item.get("__component").and_then(Value::as_str) else {
                out.push(item);
                continue;
            };
            let variant = variant.to_string();
            let populate = match variants {
                Some(on) => on.get(&variant).map(nested_populate).unwrap_or(Value::Null),
                None => nested_populate(nested),
            };
            let mut projected = self.project_component(&variant, item, &populate, ctx)?;
            if let Value::Object(map) = &mut projected {
                map.insert("__component".into(), Value::String(variant));
            }
            out.push(projected);
        }
        Ok(Value::Array(out))
    }

    fn resolve_relation(
        &self,
        target: &str,
        value: Value,
        populate: &Value,
        ctx: &Projection<'_>,
    ) -> Result<Value> {
        match value {
            Value::String(document_id) => {
                let Some(related) = self.get_entry(target, &document_id, ctx.locale, ctx.status)?
                else {
                    return Ok(Value::Null);
                };
                let attributes = self
                    .schema
                    .attributes_of(target)
                    .ok_or_else(|| anyhow!("Unknown relation target {}", target))?;
                Ok(Value::Object(self.project(
                    attributes,
                    related.to_json(),
                    populate,
                    None,
                    ctx,
                )?))
            }
            Value::Array(ids) => {
                let mut out = Vec::with_capacity(ids.len());
                for id in ids {
                    let resolved = self.resolve_relation(target, id, populate, ctx)?;
                    if !resolved.is_null() {
                        out.push(resolved);
                    }
                }
                Ok(Value::Array(out))
            }
            other => Ok(other),
        }
    }
}

impl SlugStore for Documents<'_> {
    fn find_by_slug(
        &self,
        collection: &str,
        slug: &str,
        exclude: Option<&str>,
    ) -> Result<Option<String>> {
        let conn = self.db.get()?;
        let holder = conn
            .query_row(
                "SELECT document_id FROM entries WHERE content_type = ?1 AND slug = ?2 AND (?3 IS NULL OR document_id != ?3) LIMIT 1",
                params![collection, slug, exclude],
                |row| row.get(0),
            )
            .optional()?;
        Ok(holder)
    }
}

impl DocumentStore for Documents<'_> {
    fn find_first(&self, uid: &str, params: &FindParams) -> Result<Option<Map<String, Value>>> {
        let locale = params.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        let conn = self.db.get()?;
        let entry = conn
            .query_row(
                &format!(
                    "SELECT {} FROM entries WHERE content_type = ?1 AND slug = ?2 AND status = ?3 AND locale = ?4 ORDER BY id LIMIT 1",
                    ENTRY_COLUMNS
                ),
                params![uid, params.slug, params.status.to_string(), locale],
                row_to_entry,
            )
            .optional()?;
        drop(conn);

        let Some(entry) = entry else {
            return Ok(None);
        };
        let attributes = self
            .schema
            .attributes_of(uid)
            .ok_or_else(|| anyhow!("Unknown content type {}", uid))?;

        let ctx = Projection {
            locale,
            status: params.status,
        };
        let mut out = self.project(
            attributes,
            entry.to_json(),
            &params.populate,
            params.fields.as_deref(),
            &ctx,
        )?;

        if Requested::from_value(&params.populate)
            .get("localizations")
            .is_some()
        {
            let localizations = self
                .localizations(&entry)?
                .iter()
                .map(|loc| Value::Object(loc.to_json()))
                .collect();
            out.insert("localizations".into(), Value::Array(localizations));
        }

        Ok(Some(out))
    }
}

struct Projection<'a> {
    locale: &'a str,
    status: EntryStatus,
}

/// The relational fields a populate value asks for.
enum Requested<'a> {
    All,
    Listed(Vec<&'a str>),
    Map(&'a Map<String, Value>),
    Nothing,
}

impl<'a> Requested<'a> {
    fn from_value(populate: &'a Value) -> Self {
        match populate {
            Value::String(s) if s == WILDCARD => Self::All,
            Value::String(s) => Self::Listed(s.split(',').map(str::trim).collect()),
            Value::Bool(true) => Self::All,
            Value::Array(items) => Self::Listed(items.iter().filter_map(Value::as_str).collect()),
            Value::Object(map) => Self::Map(map),
            _ => Self::Nothing,
        }
    }

    /// Instruction for one field, `None` when the field is not populated.
    fn get(&self, name: &str) -> Option<Value> {
        match self {
            Self::All => Some(Value::Bool(true)),
            Self::Listed(names) => names.contains(&name).then_some(Value::Bool(true)),
            Self::Map(map) => match map.get(name) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => None,
                Some(instruction) => Some(instruction.clone()),
            },
            Self::Nothing => None,
        }
    }
}

/// What to populate inside a populated field: `{"populate": X}` yields X, anything else nothing.
fn nested_populate(instruction: &Value) -> Value {
    instruction.get("populate").cloned().unwrap_or(Value::Null)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let status: String = row.get(4)?;
    let data: String = row.get(6)?;
    Ok(Entry {
        id: row.get(0)?,
        document_id: row.get(1)?,
        content_type: row.get(2)?,
        locale: row.get(3)?,
        status: status.parse().unwrap_or_default(),
        slug: row.get(5)?,
        data: serde_json::from_str(&data).unwrap_or_default(),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn take_slug(data: &mut Map<String, Value>) -> Option<Option<String>> {
    match data.remove("slug")? {
        Value::String(s) if !s.is_empty() => Some(Some(s)),
        _ => Some(None),
    }
}

fn strip_reserved(data: &mut Map<String, Value>) {
    for key in RESERVED_KEYS {
        data.remove(key);
    }
}

/// Creates a document through the slug hooks. Returns the draft version.
pub fn create_entry(
    db: &Database,
    schema: &SchemaRegistry,
    config: &SlugConfig,
    lifecycles: &SlugLifecycles,
    uid: &str,
    input: WriteEntry,
) -> Result<Entry> {
    if schema.content_type(uid).is_none() {
        anyhow::bail!("Unknown content type {}", uid);
    }
    let documents = Documents::new(db, schema);
    let resolver = SlugResolver::new(config, &documents);

    let mut data = input.data;
    strip_reserved(&mut data);
    lifecycles.before_create(&resolver, uid, &mut data)?;

    let slug = take_slug(&mut data).flatten();
    let document_id = uuid::Uuid::new_v4().simple().to_string();
    let locale = input.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string());
    let now = chrono::Utc::now().to_rfc3339();
    let payload = serde_json::to_string(&data)?;

    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    let mut statuses = vec![EntryStatus::Draft];
    if input.publish {
        statuses.push(EntryStatus::Published);
    }
    for status in statuses {
        tx.execute(
            "INSERT INTO entries (document_id, content_type, locale, status, slug, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![document_id, uid, locale, status.to_string(), slug, payload, now],
        )?;
    }
    tx.commit()?;
    drop(conn);

    documents
        .get_entry(uid, &document_id, &locale, EntryStatus::Draft)?
        .ok_or_else(|| anyhow!("Entry {} vanished after insert", document_id))
}

/// Updates the draft of a document through the slug hooks, publishing it when asked.
/// `None` when the document does not exist in that locale.
pub fn update_entry(
    db: &Database,
    schema: &SchemaRegistry,
    config: &SlugConfig,
    lifecycles: &SlugLifecycles,
    uid: &str,
    document_id: &str,
    input: WriteEntry,
) -> Result<Option<Entry>> {
    let documents = Documents::new(db, schema);
    let resolver = SlugResolver::new(config, &documents);
    let locale = input.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string());

    let Some(current) = documents.get_entry(uid, document_id, &locale, EntryStatus::Draft)? else {
        return Ok(None);
    };

    let mut data = input.data;
    strip_reserved(&mut data);
    lifecycles.before_update(&resolver, uid, &mut data, || Ok(Some(current.to_json())))?;

    let slug = match take_slug(&mut data) {
        Some(slug) => slug,
        None => current.slug.clone(),
    };
    let mut merged = current.data.clone();
    merged.extend(data);
    let payload = serde_json::to_string(&merged)?;
    let now = chrono::Utc::now().to_rfc3339();

    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE entries SET slug = ?1, data = ?2, updated_at = ?3 WHERE id = ?4",
        params![slug, payload, now, current.id],
    )?;
    if input.publish {
        tx.execute(
            "INSERT INTO entries (document_id, content_type, locale, status, slug, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'published', ?4, ?5, ?6, ?6)
             ON CONFLICT(document_id, locale, status) DO UPDATE SET slug = ?4, data = ?5, updated_at = ?6",
            params![document_id, uid, locale, slug, payload, now],
        )?;
    }
    tx.commit()?;
    drop(conn);

    documents.get_entry(uid, document_id, &locale, EntryStatus::Draft)
}
