use crate::models::SchemaRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound for any populate depth, configured or defaulted.
pub const MAX_POPULATE_DEPTH: usize = 20;

static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub slugs: SlugConfig,
    #[serde(default)]
    pub schema: SchemaRegistry,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Slug generation and lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlugConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_source_field")]
    pub source_field: String,
    /// Empty disables the fallback.
    #[serde(default = "default_fallback_field")]
    pub fallback_field: String,
    #[serde(default = "default_skip_field")]
    pub skip_generation_field: String,
    /// Informational only: collisions are always resolved with a numeric suffix.
    #[serde(default = "default_true")]
    pub add_suffix_for_unique: bool,
    #[serde(default)]
    pub update_existing_slugs: bool,
    /// Highest suffix tried before giving up on a base slug.
    #[serde(default = "default_max_suffix")]
    pub max_suffix: u32,
    #[serde(default)]
    pub slugify_options: SlugifyOptions,
    #[serde(default)]
    pub content_types: BTreeMap<String, ContentTypeOverride>,
    #[serde(default = "default_populate_depth")]
    pub default_populate_depth: usize,
    #[serde(default)]
    pub populate_depth: BTreeMap<String, usize>,
    #[serde(default)]
    pub populate_patterns: BTreeMap<String, serde_json::Value>,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_field: default_source_field(),
            fallback_field: default_fallback_field(),
            skip_generation_field: default_skip_field(),
            add_suffix_for_unique: true,
            update_existing_slugs: false,
            max_suffix: default_max_suffix(),
            slugify_options: SlugifyOptions::default(),
            content_types: BTreeMap::new(),
            default_populate_depth: default_populate_depth(),
            populate_depth: BTreeMap::new(),
            populate_patterns: BTreeMap::new(),
        }
    }
}

impl SlugConfig {
    /// `false` only when the content type is explicitly switched off.
    pub fn is_enabled_for(&self, uid: &str) -> bool {
        self.content_types
            .get(uid)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    pub fn populate_depth_for(&self, uid: &str) -> usize {
        self.populate_depth
            .get(uid)
            .copied()
            .unwrap_or(self.default_populate_depth)
    }

    pub fn fallback_field(&self) -> Option<&str> {
        Some(self.fallback_field.as_str()).filter(|f| !f.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FIELD_NAME.is_match(&self.source_field) {
            return Err(ConfigError::invalid(
                "slugs.source_field",
                "must be a non-empty field name",
            ));
        }
        if !self.fallback_field.is_empty() && !FIELD_NAME.is_match(&self.fallback_field) {
            return Err(ConfigError::invalid(
                "slugs.fallback_field",
                "must be a field name or empty",
            ));
        }
        if !FIELD_NAME.is_match(&self.skip_generation_field) {
            return Err(ConfigError::invalid(
                "slugs.skip_generation_field",
                "must be a non-empty field name",
            ));
        }
        if self.max_suffix == 0 {
            return Err(ConfigError::invalid(
                "slugs.max_suffix",
                "must be greater than 0",
            ));
        }
        if self.default_populate_depth > MAX_POPULATE_DEPTH {
            return Err(ConfigError::invalid(
                "slugs.default_populate_depth",
                format!("must be {} or less", MAX_POPULATE_DEPTH),
            ));
        }
        for (uid, depth) in &self.populate_depth {
            if *depth > MAX_POPULATE_DEPTH {
                return Err(ConfigError::invalid(
                    format!("slugs.populate_depth.\"{}\"", uid),
                    format!("must be {} or less", MAX_POPULATE_DEPTH),
                ));
            }
        }
        for (uid, pattern) in &self.populate_patterns {
            if !(pattern.is_object() || pattern.is_string()) {
                return Err(ConfigError::invalid(
                    format!("slugs.populate_patterns.\"{}\"", uid),
                    "must be a table or a string",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentTypeOverride {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlugifyOptions {
    #[serde(default = "default_true")]
    pub lower: bool,
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Language table applied before transliteration; empty for none.
    #[serde(default = "default_slug_locale")]
    pub locale: String,
}

impl Default for SlugifyOptions {
    fn default() -> Self {
        Self {
            lower: true,
            strict: true,
            locale: default_slug_locale(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    1337
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_slug_locale() -> String {
    "lt".to_string()
}

fn default_source_field() -> String {
    "title".to_string()
}

fn default_fallback_field() -> String {
    "name".to_string()
}

fn default_skip_field() -> String {
    "skipSlugGeneration".to_string()
}

fn default_max_suffix() -> u32 {
    10_000
}

fn default_populate_depth() -> usize {
    5
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::invalid(
                "database.pool_size",
                "must be greater than 0",
            ));
        }
        if !self.server.api_prefix.starts_with('/') {
            return Err(ConfigError::invalid(
                "server.api_prefix",
                "must start with '/'",
            ));
        }
        self.slugs.validate()?;
        for (uid, ct) in &self.schema.content_types {
            if ct.plural_name.is_empty() || ct.singular_name.is_empty() {
                return Err(ConfigError::invalid(
                    format!("schema.content_types.\"{}\"", uid),
                    "needs singular_name and plural_name",
                ));
            }
        }
        Ok(())
    }
}
