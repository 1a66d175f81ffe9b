use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use crate::content::content_type::{ContentStatus, ContentType};

pub mod content_type;

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub Uuid);

impl ContentId {
    pub fn new() -> Self {
        ContentId(Uuid::new_v4())
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ContentId(Uuid::parse_str(s)?))
    }
}

/// One unit of material shown on the site.
///
/// `external_url` is the natural key used by the WordPress sync. Items
/// created by hand may not have one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub content_html: Option<String>,
    pub external_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

/// Fields of a record about to be inserted. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub content_html: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ContentStatus,
    #[serde(skip)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub content_html: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<ContentStatus>,
    // Outer None: untouched. Some(None): cleared.
    #[serde(skip)]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ContentItem {
    pub fn from_new(new: NewContent, now: DateTime<Utc>) -> Self {
        ContentItem {
            id: ContentId::new(),
            title: new.title,
            description: new.description,
            content_type: new.content_type,
            content_html: non_empty(new.content_html),
            external_url: non_empty(new.external_url),
            thumbnail_url: non_empty(new.thumbnail_url),
            category: non_empty(new.category),
            tags: new.tags,
            status: new.status,
            published_at: new.published_at,
            created_at: now,
            updated_at: now,
            author_id: new.author_id,
            metadata: new.metadata,
        }
    }

    pub fn apply(&mut self, changes: ContentChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(content_type) = changes.content_type {
            self.content_type = content_type;
        }
        if changes.content_html.is_some() {
            self.content_html = non_empty(changes.content_html);
        }
        if changes.external_url.is_some() {
            self.external_url = non_empty(changes.external_url);
        }
        if changes.thumbnail_url.is_some() {
            self.thumbnail_url = non_empty(changes.thumbnail_url);
        }
        if changes.category.is_some() {
            self.category = non_empty(changes.category);
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(published_at) = changes.published_at {
            self.published_at = published_at;
        }
        if let Some(metadata) = changes.metadata {
            self.metadata = metadata;
        }
        self.updated_at = now;
    }

    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }
}
