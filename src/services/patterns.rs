use crate::config::Config;
use crate::models::ContentKind;
use serde_json::Value;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq)]
enum Pattern {
    /// `{ populate = ..., fields = ... }`
    Structured {
        populate: Option<Value>,
        fields: Option<Value>,
    },
    /// Any other value is the populate instruction itself.
    Populate(Value),
}

impl Pattern {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(map) if map.contains_key("populate") || map.contains_key("fields") => {
                Some(Self::Structured {
                    populate: map.get("populate").filter(|v| !v.is_null()).cloned(),
                    fields: map.get("fields").filter(|v| !v.is_null()).cloned(),
                })
            }
            other => Some(Self::Populate(other.clone())),
        }
    }
}

/// Default `populate` / `fields` query parameters per API endpoint.
#[derive(Debug, Clone, Default)]
pub struct PopulatePatterns {
    endpoints: Vec<(String, Pattern)>,
}

impl PopulatePatterns {
    pub fn from_config(config: &Config) -> Self {
        let prefix = config.server.api_prefix.trim_end_matches('/');
        let mut endpoints = Vec::new();

        for (uid, value) in &config.slugs.populate_patterns {
            let Some(pattern) = Pattern::from_value(value) else {
                continue;
            };
            let Some(ct) = config.schema.content_type(uid) else {
                tracing::warn!("Populate pattern for unknown content type {}", uid);
                continue;
            };
            let name = match ct.kind {
                ContentKind::Single => &ct.singular_name,
                ContentKind::Collection => &ct.plural_name,
            };
            endpoints.push((format!("{}/{}", prefix, name), pattern));
        }

        if !endpoints.is_empty() {
            tracing::info!("Injecting populate patterns for {} endpoint(s)", endpoints.len());
        }
        Self { endpoints }
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The query string to use for `path`, or `None` when the request is left alone.
    pub fn apply(&self, path: &str, query: Option<&str>) -> Option<String> {
        let (_, pattern) = self.endpoints.iter().find(|(endpoint, _)| {
            path == endpoint
                || path
                    .strip_prefix(endpoint.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })?;

        let pairs: Vec<(String, String)> = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let has = |key: &str| {
            pairs.iter().any(|(k, v)| {
                !v.is_empty() && (k == key || k.starts_with(&format!("{}[", key)))
            })
        };
        let has_populate = has("populate");
        let has_fields = has("fields");

        let mut added = Vec::new();
        match pattern {
            Pattern::Structured { populate, fields } => {
                if let (false, Some(populate)) = (has_populate, populate) {
                    added.push(("populate", encode_populate(populate)));
                }
                if let (false, Some(fields)) = (has_fields, fields) {
                    added.push(("fields", encode_fields(fields)));
                }
            }
            Pattern::Populate(populate) => {
                if !has_populate {
                    added.push(("populate", encode_populate(populate)));
                }
            }
        }
        if added.is_empty() {
            return None;
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        serializer.extend_pairs(added.iter().map(|(k, v)| (*k, v.as_str())));
        Some(serializer.finish())
    }
}

fn encode_populate(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "*".to_string(),
        other => other.to_string(),
    }
}

fn encode_fields(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
