use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Draft,
    Published,
}

impl EntryStatus {
    /// `preview` and `draft` read drafts, anything else reads the published version.
    pub fn from_publication_state(state: Option<&str>) -> Self {
        match state {
            Some("preview" | "draft") => Self::Draft,
            _ => Self::Published,
        }
    }
}

impl FromStr for EntryStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

/// One stored version (locale + status) of a document.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: i64,
    pub document_id: String,
    pub content_type: String,
    pub locale: String,
    pub status: EntryStatus,
    pub slug: Option<String>,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entry {
    /// The entry as the API sees it: stored fields plus identity columns.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut out = self.data.clone();
        out.insert("id".into(), self.id.into());
        out.insert("documentId".into(), self.document_id.clone().into());
        out.insert("locale".into(), self.locale.clone().into());
        match &self.slug {
            Some(slug) => out.insert("slug".into(), slug.clone().into()),
            None => out.insert("slug".into(), serde_json::Value::Null),
        };
        out.insert("createdAt".into(), self.created_at.clone().into());
        out.insert("updatedAt".into(), self.updated_at.clone().into());
        out.insert(
            "publishedAt".into(),
            match self.status {
                EntryStatus::Published => self.updated_at.clone().into(),
                EntryStatus::Draft => serde_json::Value::Null,
            },
        );
        out
    }
}

#[derive(Debug, Deserialize)]
pub struct WriteEntry {
    pub data: serde_json::Map<String, serde_json::Value>,
    pub locale: Option<String>,
    #[serde(default)]
    pub publish: bool,
}
