use crate::models::SchemaRegistry;
use crate::services::slug::{extract_text, SlugError, SlugResolver, SlugStore};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct ContentTypeWithSlug {
    pub uid: String,
    pub display_name: String,
    pub has_title_field: bool,
    pub has_name_field: bool,
}

/// API content types (`api::` uids) that declare a `slug` attribute.
pub fn content_types_with_slug(schema: &SchemaRegistry) -> Vec<ContentTypeWithSlug> {
    schema
        .content_types
        .iter()
        .filter(|(uid, _)| uid.starts_with("api::"))
        .filter(|(_, ct)| ct.attributes.contains_key("slug"))
        .map(|(uid, ct)| ContentTypeWithSlug {
            uid: uid.clone(),
            display_name: ct.display_name.clone().unwrap_or_else(|| uid.clone()),
            has_title_field: ct.attributes.contains_key("title"),
            has_name_field: ct.attributes.contains_key("name"),
        })
        .collect()
}

/// Content types whose writes go through the slug hooks.
#[derive(Debug, Clone, Default)]
pub struct SlugLifecycles {
    models: BTreeSet<String>,
}

impl SlugLifecycles {
    pub fn register(schema: &SchemaRegistry) -> Self {
        let types = content_types_with_slug(schema);
        if types.is_empty() {
            tracing::warn!("No content types with a slug field");
        }

        let mut models = BTreeSet::new();
        for ct in types {
            tracing::info!("Registering slug lifecycle for {} ({})", ct.display_name, ct.uid);
            models.insert(ct.uid);
        }

        Self { models }
    }

    pub fn is_subscribed(&self, uid: &str) -> bool {
        self.models.contains(uid)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    /// Fills in `slug` on a new entry unless one was supplied.
    pub fn before_create<S: SlugStore + ?Sized>(
        &self,
        resolver: &SlugResolver<'_, S>,
        uid: &str,
        data: &mut Map<String, Value>,
    ) -> Result<(), SlugError> {
        if !self.is_subscribed(uid) || !extract_text(data.get("slug")).is_empty() {
            return Ok(());
        }

        let outcome = resolver.resolve_slug_for_entry(data, uid, None)?;
        if let Some(slug) = outcome.into_slug() {
            tracing::info!("Slug created for {}: {}", uid, slug);
            data.insert("slug".into(), Value::String(slug));
        }
        Ok(())
    }

    /// Recomputes `slug` when the update touches the source or fallback field.
    ///
    /// The persisted entry is only fetched when a recompute is actually considered.
    pub fn before_update<S, F>(
        &self,
        resolver: &SlugResolver<'_, S>,
        uid: &str,
        data: &mut Map<String, Value>,
        fetch_current: F,
    ) -> Result<(), SlugError>
    where
        S: SlugStore + ?Sized,
        F: FnOnce() -> anyhow::Result<Option<Map<String, Value>>>,
    {
        if !self.is_subscribed(uid) {
            return Ok(());
        }

        let config = resolver.config();
        let touches_source = !extract_text(data.get(&config.source_field)).is_empty()
            || config
                .fallback_field()
                .is_some_and(|field| !extract_text(data.get(field)).is_empty());
        if !touches_source {
            return Ok(());
        }

        let Some(current) = fetch_current()? else {
            tracing::warn!("Could not find entity for update of {}", uid);
            return Ok(());
        };

        let outcome = resolver.resolve_slug_for_entry(data, uid, Some(&current))?;
        match outcome.into_slug() {
            Some(slug) => {
                tracing::info!("Slug updated for {}: {}", uid, slug);
                data.insert("slug".into(), Value::String(slug));
            }
            None => {
                if let Some(existing) = current.get("slug").and_then(Value::as_str) {
                    tracing::debug!("Keeping existing slug {}", existing);
                }
            }
        }
        Ok(())
    }
}
