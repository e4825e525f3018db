use crate::config::{SlugConfig, SlugifyOptions};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

const REPLACEMENT: &str = "-";

/// Punctuation kept by the non-strict pass, on top of ASCII alphanumerics and whitespace.
const ALLOWED_PUNCTUATION: &str = "_$*+~.()'\"!-:@";

static SYMBOLS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('$', "dollar"),
        ('%', "percent"),
        ('&', "and"),
        ('<', "less"),
        ('>', "greater"),
        ('|', "or"),
        ('¢', "cent"),
        ('£', "pound"),
        ('¤', "currency"),
        ('¥', "yen"),
        ('©', "(c)"),
        ('®', "(r)"),
        ('€', "euro"),
        ('₹', "indian rupee"),
        ('™', "tm"),
        ('∑', "sum"),
        ('∞', "infinity"),
        ('♥', "love"),
    ])
});

static LOCALES: Lazy<HashMap<&'static str, HashMap<char, &'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "de",
            HashMap::from([
                ('Ä', "AE"),
                ('ä', "ae"),
                ('Ö', "OE"),
                ('ö', "oe"),
                ('Ü', "UE"),
                ('ü', "ue"),
                ('ß', "ss"),
                ('%', "prozent"),
                ('&', "und"),
                ('|', "oder"),
                ('∑', "summe"),
                ('∞', "unendlich"),
                ('♥', "liebe"),
            ]),
        ),
        (
            "es",
            HashMap::from([
                ('%', "por ciento"),
                ('&', "y"),
                ('<', "menor que"),
                ('>', "mayor que"),
                ('|', "o"),
                ('¢', "centavos"),
                ('£', "libras"),
                ('¤', "moneda"),
                ('∑', "suma"),
                ('∞', "infinito"),
                ('♥', "amor"),
            ]),
        ),
        (
            "fr",
            HashMap::from([
                ('%', "pourcent"),
                ('&', "et"),
                ('<', "plus petit"),
                ('>', "plus grand"),
                ('|', "ou"),
                ('¢', "centime"),
                ('£', "livre"),
                ('¤', "devise"),
                ('∑', "somme"),
                ('∞', "infini"),
                ('♥', "amour"),
            ]),
        ),
        (
            "lt",
            HashMap::from([
                ('Ą', "A"),
                ('Č', "C"),
                ('Ę', "E"),
                ('Ė', "E"),
                ('Į', "I"),
                ('Š', "S"),
                ('Ų', "U"),
                ('Ū', "U"),
                ('Ž', "Z"),
                ('ą', "a"),
                ('č', "c"),
                ('ę', "e"),
                ('ė', "e"),
                ('į', "i"),
                ('š', "s"),
                ('ų', "u"),
                ('ū', "u"),
                ('ž', "z"),
            ]),
        ),
        (
            "uk",
            HashMap::from([
                ('И', "Y"),
                ('и', "y"),
                ('Й', "Y"),
                ('й', "y"),
                ('Ц', "TS"),
                ('ц', "ts"),
                ('Х', "KH"),
                ('х', "kh"),
                ('Щ', "SHCH"),
                ('щ', "shch"),
                ('Г', "H"),
                ('г', "h"),
            ]),
        ),
        ("vi", HashMap::from([('Đ', "D"), ('đ', "d")])),
    ])
});

/// Source of truth for which slugs are taken.
pub trait SlugStore {
    /// Document id of an entry of `collection` holding `slug`, ignoring the document `exclude`.
    fn find_by_slug(
        &self,
        collection: &str,
        slug: &str,
        exclude: Option<&str>,
    ) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("no free slug for '{base}' after {attempts} attempts")]
    SuffixExhausted { base: String, attempts: u32 },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    DisabledForType,
    Locked,
    SlugPresent,
    NoSourceText,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "slug generation disabled"),
            Self::DisabledForType => write!(f, "slug generation disabled for content type"),
            Self::Locked => write!(f, "slug locked by skip field"),
            Self::SlugPresent => write!(f, "slug already set"),
            Self::NoSourceText => write!(f, "no source text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugOutcome {
    Generated(String),
    Skipped(SkipReason),
}

impl SlugOutcome {
    /// The slug to write back, if any. Empty results are never written.
    pub fn into_slug(self) -> Option<String> {
        match self {
            Self::Generated(slug) if !slug.is_empty() => Some(slug),
            _ => None,
        }
    }
}

/// Text usable as slug source: strings as they are, anything else empty.
pub fn extract_text(value: Option<&Value>) -> &str {
    match value {
        Some(Value::String(s)) => s.as_str(),
        _ => "",
    }
}

pub fn slugify(text: &str, options: &SlugifyOptions) -> String {
    let locale = LOCALES.get(options.locale.as_str());
    let mut raw = String::with_capacity(text.len());

    for ch in text.chars() {
        let mapped: Cow<'_, str> = match locale
            .and_then(|m| m.get(&ch))
            .or_else(|| SYMBOLS.get(&ch))
        {
            Some(s) => Cow::Borrowed(*s),
            None => transliterate(ch),
        };
        if mapped == REPLACEMENT {
            raw.push(' ');
            continue;
        }
        raw.extend(mapped.chars().filter(|c| is_allowed(*c)));
    }

    if options.strict {
        raw.retain(|c| c.is_ascii_alphanumeric() || c.is_whitespace());
    }

    let slug = raw.split_whitespace().collect::<Vec<_>>().join(REPLACEMENT);

    if options.lower {
        slug.to_lowercase()
    } else {
        slug
    }
}

fn transliterate(ch: char) -> Cow<'static, str> {
    if ch.is_ascii() || ch.is_whitespace() {
        return Cow::Owned(ch.to_string());
    }
    let ascii = slug::slugify(ch.to_string()).replace(REPLACEMENT, " ");
    if ch.is_uppercase() {
        Cow::Owned(ascii.to_uppercase())
    } else {
        Cow::Owned(ascii)
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(c)
}

/// Produces slugs that are unique within a content type.
pub struct SlugResolver<'a, S: ?Sized> {
    config: &'a SlugConfig,
    store: &'a S,
}

impl<'a, S: SlugStore + ?Sized> SlugResolver<'a, S> {
    pub fn new(config: &'a SlugConfig, store: &'a S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &SlugConfig {
        self.config
    }

    /// Probes `base`, `base-1`, `base-2`, ... until the store reports the candidate free.
    ///
    /// Each probe is a separate store query. Nothing is reserved, so two writers racing on the
    /// same text can still end up with the same slug.
    pub fn resolve_unique_slug(
        &self,
        text: &str,
        collection: &str,
        exclude: Option<&str>,
        options: &SlugifyOptions,
    ) -> Result<String, SlugError> {
        if text.is_empty() {
            tracing::debug!("Empty text for slug generation");
            return Ok(String::new());
        }

        let base = slugify(text, options);
        if base.is_empty() {
            tracing::debug!("Text {:?} slugifies to nothing", text);
            return Ok(String::new());
        }

        let mut candidate = base.clone();
        let mut suffix = 0u32;
        loop {
            match self.store.find_by_slug(collection, &candidate, exclude)? {
                None => {
                    tracing::debug!("Unique slug for {}: {}", collection, candidate);
                    return Ok(candidate);
                }
                Some(holder) => {
                    tracing::debug!("Slug {} already used by {}", candidate, holder);
                }
            }

            suffix += 1;
            if suffix > self.config.max_suffix {
                return Err(SlugError::SuffixExhausted {
                    base,
                    attempts: suffix,
                });
            }
            candidate = format!("{}{}{}", base, REPLACEMENT, suffix);
        }
    }

    /// Applies the generation policy to an entry about to be written.
    ///
    /// `current` is the persisted version when updating; its `documentId` is excluded from the
    /// collision check and its skip field is inherited when `data` omits it.
    pub fn resolve_slug_for_entry(
        &self,
        data: &Map<String, Value>,
        collection: &str,
        current: Option<&Map<String, Value>>,
    ) -> Result<SlugOutcome, SlugError> {
        let config = self.config;

        if !config.enabled {
            return Ok(SlugOutcome::Skipped(SkipReason::Disabled));
        }
        if !config.is_enabled_for(collection) {
            tracing::debug!("Slug generation disabled for {}", collection);
            return Ok(SlugOutcome::Skipped(SkipReason::DisabledForType));
        }

        let skip_field = config.skip_generation_field.as_str();
        let locked = match data.get(skip_field) {
            Some(value) => value == &Value::Bool(true),
            None => current
                .and_then(|c| c.get(skip_field))
                .map_or(false, |value| value == &Value::Bool(true)),
        };
        if locked {
            tracing::debug!("Slug generation skipped, {} is set", skip_field);
            return Ok(SlugOutcome::Skipped(SkipReason::Locked));
        }

        let has_slug = !extract_text(data.get("slug")).is_empty();
        if has_slug && !config.update_existing_slugs {
            return Ok(SlugOutcome::Skipped(SkipReason::SlugPresent));
        }

        let mut text = extract_text(data.get(&config.source_field));
        if text.is_empty() {
            if let Some(fallback) = config.fallback_field() {
                text = extract_text(data.get(fallback));
            }
        }
        if text.is_empty() {
            tracing::debug!(
                "No text for slug in {} (checked {}, {})",
                collection,
                config.source_field,
                config.fallback_field
            );
            return Ok(SlugOutcome::Skipped(SkipReason::NoSourceText));
        }

        let exclude = current
            .and_then(|c| c.get("documentId"))
            .and_then(Value::as_str);

        let slug =
            self.resolve_unique_slug(text, collection, exclude, &config.slugify_options)?;
        Ok(SlugOutcome::Generated(slug))
    }
}
