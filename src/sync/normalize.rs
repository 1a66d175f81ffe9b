use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::category::{primary_category, resolve_names, CategoryTable};
use crate::content::{ContentChanges, ContentStatus, ContentType, NewContent};
use crate::error::SyncError;
use crate::source::post::{CategoryRefs, SourcePost};
use crate::text_utils::{plain_text, truncate_with_marker};

/// Everything synced posts become.
pub const INGESTED_TYPE: ContentType = ContentType::BlogPost;

/// A source post mapped onto the content model, keyed by its link.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedContent {
    pub external_url: String,
    pub title: String,
    pub description: String,
    pub content_html: String,
    pub category: String,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub metadata: Value,
}

impl SyncedContent {
    pub fn into_new_content(self) -> NewContent {
        NewContent {
            title: self.title,
            description: self.description,
            content_type: INGESTED_TYPE,
            content_html: Some(self.content_html),
            external_url: Some(self.external_url),
            thumbnail_url: None,
            category: Some(self.category),
            tags: self.tags,
            status: ContentStatus::Published,
            published_at: Some(self.published_at),
            author_id: None,
            metadata: self.metadata,
        }
    }

    /// The same fields as an update. The key itself and fields the sync does
    /// not own (thumbnail, author) are left alone.
    pub fn into_changes(self) -> ContentChanges {
        ContentChanges {
            title: Some(self.title),
            description: Some(self.description),
            content_type: Some(INGESTED_TYPE),
            content_html: Some(self.content_html),
            external_url: None,
            thumbnail_url: None,
            category: Some(self.category),
            tags: Some(self.tags),
            status: Some(ContentStatus::Published),
            published_at: Some(Some(self.published_at)),
            metadata: Some(self.metadata),
        }
    }
}

// Every ingested post is treated as published, whatever the source says.
pub fn normalize(post: &SourcePost, fetched: &CategoryTable, fallback: &CategoryTable, excerpt_length: usize) -> Result<SyncedContent, SyncError> {
    let published_at = post.published_at()?;

    let names = match post.categories {
        CategoryRefs::Ids(ref ids) => resolve_names(ids, fetched, fallback),
        CategoryRefs::Named(_) => post.categories.embedded_names(),
    };
    let category = primary_category(&names);

    Ok(SyncedContent {
        external_url: post.link.trim().to_string(),
        title: plain_text(post.title.as_str()),
        description: truncate_with_marker(&plain_text(post.excerpt.as_str()), excerpt_length),
        content_html: post.content.as_str().to_string(),
        category,
        tags: names,
        published_at,
        metadata: post.provenance(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use crate::category::{CategoryEntry, DEFAULT_CATEGORY};

    use super::*;

    fn fetched() -> CategoryTable {
        CategoryTable::from_entries(vec![
            CategoryEntry { id: 3, name: "Fintech".to_string() },
            CategoryEntry { id: 5, name: "Regulation".to_string() },
        ])
    }

    #[test]
    fn test_normalize_wp_post() {
        let value = json!({
            "id": 101,
            "date": "2024-05-01T10:00:00",
            "link": "https://blog.example.com/2024/05/01/rbi-strikes-again/",
            "title": {"rendered": "RBI strikes <em>again</em>"},
            "content": {"rendered": "<p>Full <strong>body</strong></p>"},
            "excerpt": {"rendered": "<p>The regulator acts</p>\n"},
            "categories": [5, 3, 99],
            "tags": [],
            "featured_media": 12
        });
        let post = SourcePost::from_value(&value).unwrap();
        let content = normalize(&post, &fetched(), &CategoryTable::builtin(), 300).unwrap();

        assert_eq!(content.title, "RBI strikes again");
        assert_eq!(content.description, "The regulator acts...");
        assert_eq!(content.content_html, "<p>Full <strong>body</strong></p>");
        assert_eq!(content.category, "Regulation");
        assert_eq!(content.tags, ["Regulation", "Fintech"]);
        assert_eq!(content.published_at, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert_eq!(content.metadata["original_categories"], json!([5, 3, 99]));

        let new = content.into_new_content();
        assert_eq!(new.status, ContentStatus::Published);
        assert_eq!(new.content_type, ContentType::BlogPost);
        assert_eq!(new.published_at, Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn test_unresolved_categories() {
        let value = json!({
            "date": "2024-05-01T10:00:00",
            "link": "https://blog.example.com/p/1",
            "title": {"rendered": "Untagged"},
            "categories": [404]
        });
        let post = SourcePost::from_value(&value).unwrap();
        let content = normalize(&post, &CategoryTable::new(), &CategoryTable::new(), 300).unwrap();
        assert_eq!(content.category, DEFAULT_CATEGORY);
        assert!(content.tags.is_empty());
    }

    #[test]
    fn test_embedded_category_names() {
        let value = json!({
            "date": "2024-05-01T10:00:00+00:00",
            "URL": "https://blog.example.com/p/2",
            "title": "Web3 weekly",
            "categories": {"Web3": {"ID": 9, "name": "Web3"}}
        });
        let post = SourcePost::from_value(&value).unwrap();
        let content = normalize(&post, &CategoryTable::new(), &CategoryTable::new(), 300).unwrap();
        assert_eq!(content.category, "Web3");
        assert_eq!(content.tags, ["Web3"]);
    }

    #[test]
    fn test_long_excerpt_is_truncated() {
        let value = json!({
            "date": "2024-05-01T10:00:00",
            "link": "https://blog.example.com/p/3",
            "title": {"rendered": "Long"},
            "excerpt": {"rendered": format!("<p>{}</p>", "x".repeat(500))}
        });
        let post = SourcePost::from_value(&value).unwrap();
        let content = normalize(&post, &CategoryTable::new(), &CategoryTable::new(), 300).unwrap();
        assert_eq!(content.description.chars().count(), 303);
    }

    #[test]
    fn test_changes_leave_key_alone() {
        let value = json!({
            "date": "2024-05-01T10:00:00",
            "link": "https://blog.example.com/p/4",
            "title": {"rendered": "Key"}
        });
        let post = SourcePost::from_value(&value).unwrap();
        let changes = normalize(&post, &CategoryTable::new(), &CategoryTable::new(), 300).unwrap().into_changes();
        assert_eq!(changes.external_url, None);
        assert_eq!(changes.thumbnail_url, None);
        assert_eq!(changes.status, Some(ContentStatus::Published));
    }
}
