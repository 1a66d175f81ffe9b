use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::error::SyncError;
use crate::text_utils::parse_source_date;

/// Text fields come as `{"rendered": "..."}` from wp/v2 and as plain strings from rest/v1.1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RenderedText {
    Rendered { rendered: String },
    Plain(String),
}

impl Default for RenderedText {
    fn default() -> Self {
        RenderedText::Plain(String::new())
    }
}

impl RenderedText {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedText::Rendered { rendered } => rendered,
            RenderedText::Plain(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedCategory {
    #[serde(default, alias = "ID")]
    pub id: Option<u64>,
    pub name: String,
}

/// Embedded categories in the order the source listed them. The map keys
/// repeat the names and are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedCategories(pub Vec<NamedCategory>);

impl<'de> Deserialize<'de> for NamedCategories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{MapAccess, Visitor};

        struct NamedCategoriesVisitor;

        impl<'de> Visitor<'de> for NamedCategoriesVisitor {
            type Value = NamedCategories;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of category name to category")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_, category)) = map.next_entry::<String, NamedCategory>()? {
                    categories.push(category);
                }
                Ok(NamedCategories(categories))
            }
        }

        deserializer.deserialize_map(NamedCategoriesVisitor)
    }
}

/// wp/v2 lists numeric ids to be resolved against the category directory;
/// rest/v1.1 embeds the categories keyed by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryRefs {
    Ids(Vec<u64>),
    Named(NamedCategories),
}

impl Default for CategoryRefs {
    fn default() -> Self {
        CategoryRefs::Ids(vec![])
    }
}

impl CategoryRefs {
    pub fn ids(&self) -> Vec<u64> {
        match self {
            CategoryRefs::Ids(ids) => ids.clone(),
            CategoryRefs::Named(named) => named.0.iter().filter_map(|c| c.id).collect(),
        }
    }

    /// Source order, each name once.
    pub fn embedded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        if let CategoryRefs::Named(named) = self {
            for category in &named.0 {
                if !names.contains(&category.name) {
                    names.push(category.name.clone());
                }
            }
        }
        names
    }
}

/// A blog post as the external API returns it. Never stored as is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourcePost {
    #[serde(default, alias = "ID")]
    pub id: Option<u64>,
    pub title: RenderedText,
    #[serde(default)]
    pub content: RenderedText,
    #[serde(default)]
    pub excerpt: RenderedText,
    pub date: String,
    #[serde(default)]
    pub date_gmt: Option<String>,
    #[serde(alias = "URL")]
    pub link: String,
    #[serde(default)]
    pub categories: CategoryRefs,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub featured_media: Option<Value>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

impl SourcePost {
    pub fn from_value(value: &Value) -> Result<SourcePost, SyncError> {
        let post = SourcePost::deserialize(value)
            .map_err(|e| SyncError::MalformedPost { reason: e.to_string() })?;
        if post.link.trim().is_empty() {
            return Err(SyncError::MalformedPost { reason: "post without link".to_string() });
        }
        Ok(post)
    }

    /// `date_gmt` when it parses, `date` otherwise.
    pub fn published_at(&self) -> Result<DateTime<Utc>, SyncError> {
        if let Some(Ok(date)) = self.date_gmt.as_deref().map(parse_source_date) {
            return Ok(date);
        }
        parse_source_date(&self.date)
            .map_err(|reason| SyncError::MalformedPost { reason })
    }

    pub fn provenance(&self) -> Value {
        let origin_id = match self.id {
            Some(id) => json!(id),
            None => json!(self.link),
        };
        let featured = match (&self.featured_media, &self.featured_image) {
            (Some(media), _) => media.clone(),
            (None, Some(image)) => json!(image),
            (None, None) => Value::Null,
        };
        json!({
            "wordpress_id": origin_id,
            "original_categories": self.categories.ids(),
            "original_tags": self.tags,
            "featured_media": featured,
        })
    }
}
